//! Wave Installer - Main entry point
//!
//! Parses the command line, sets up tracing, then runs either the
//! interactive TUI or a headless install of a saved plan.

use std::io::{stderr, stdout};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use wave_installer::app::App;
use wave_installer::cli::{Cli, Commands};
use wave_installer::config::InstallerConfig;
use wave_installer::inventory::MockInventory;
use wave_installer::pipeline::{
    InstallPipeline, PipelineOutcome, check_fault_stage, format_remaining, total_duration_secs,
};
use wave_installer::plan::InstallPlan;
use wave_installer::progress::ConsoleSink;

/// Initialize tracing. Interactive runs only log when a file is given,
/// since the TUI owns the terminal.
fn init_tracing(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .init();
        }
        None if !interactive => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let interactive = match &cli.command {
        None => true,
        Some(Commands::Install { plan, .. }) => plan.is_none(),
        Some(_) => false,
    };
    if let Err(e) = init_tracing(cli.log_file.as_deref(), interactive) {
        eprintln!("✗ {:#}", e);
        return ExitCode::FAILURE;
    }
    info!("Wave installer starting up");

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("✗ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = InstallerConfig::load_or_default(cli.config.as_deref())?
        .with_tick_interval_ms(cli.tick_ms);
    debug!(
        tick_ms = config.tick_interval_ms,
        queue = config.queue_capacity,
        "Configuration resolved"
    );

    match cli.command {
        Some(Commands::Validate { plan }) => validate_plan(&plan),
        Some(Commands::Stages) => {
            print_stages(&config);
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Install {
            plan: Some(plan),
            fail_at_stage,
            ..
        }) => run_headless(&config, &plan, fail_at_stage),
        Some(Commands::Install {
            plan: None,
            save_plan,
            fail_at_stage,
        }) => run_tui(config, save_plan, fail_at_stage),
        None => run_tui(config, None, None),
    }
}

fn validate_plan(path: &Path) -> Result<ExitCode> {
    info!("Validating install plan: {:?}", path);
    let plan = InstallPlan::load_from_file(path)?;

    match plan.validate() {
        Ok(()) => {
            println!("✓ Install plan is valid: {}", path.display());
            for (label, value) in plan.summary() {
                println!("  {:<10} {}", label, value);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Install plan validation failed: {}", e);
            eprintln!("✗ Install plan validation failed on the {} screen:", e.screen);
            for reason in &e.reasons {
                eprintln!("  - {}", reason);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_stages(config: &InstallerConfig) {
    for (i, stage) in config.stages.iter().enumerate() {
        println!(
            "{:>2}. {:<28} {}",
            i + 1,
            stage.name,
            format_remaining(u64::from(stage.estimated_duration_secs))
        );
    }
    println!(
        "Total estimated time: {}",
        format_remaining(total_duration_secs(&config.stages))
    );
}

/// Run a saved plan without the TUI, printing progress to stdout.
fn run_headless(config: &InstallerConfig, path: &Path, fail_at: Option<usize>) -> Result<ExitCode> {
    let plan = InstallPlan::load_from_file(path)?;
    plan.validate()?;
    info!("Running headless installation with plan: {:?}", path);

    let pipeline = InstallPipeline::new(config.stages.clone(), plan, config.pipeline_options())?;
    let stage_count = pipeline.stages().len();
    let backend = pipeline.simulated_backend(fail_at)?;

    let mut handle = pipeline.start(backend)?;
    let mut sink = ConsoleSink::new(stdout().lock(), stage_count);
    match handle.wait(&mut sink)? {
        PipelineOutcome::Completed => Ok(ExitCode::SUCCESS),
        PipelineOutcome::Failed { reason } => {
            error!("Installation failed: {}", reason);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Run the interactive installer, restoring the terminal however it exits.
fn run_tui(
    config: InstallerConfig,
    save_plan: Option<std::path::PathBuf>,
    fail_at: Option<usize>,
) -> Result<ExitCode> {
    check_fault_stage(&config.stages, fail_at)?;
    debug!("Initializing terminal for TUI mode");

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode().context("Failed to enable raw mode")?;
    crossterm::execute!(stdout(), EnterAlternateScreen)
        .context("Failed to enter alternate screen")?;

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .context("Failed to create terminal")
        .and_then(|mut terminal| {
            let mut app = App::new(config, Box::new(MockInventory), save_plan, fail_at);
            app.run(&mut terminal).map_err(anyhow::Error::from)
        });

    // Always attempt cleanup, even if the app failed
    restore_terminal();

    result.map(|outcome| match outcome {
        Some(PipelineOutcome::Failed { .. }) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(stdout(), LeaveAlternateScreen);
}
