use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wave Installer - A guided Wave OS installer with TUI interface
#[derive(Parser)]
#[command(name = "wave-installer")]
#[command(about = "A guided Wave OS installer with a terminal interface")]
#[command(version)]
pub struct Cli {
    /// Installer configuration file (stage list, pacing, queue size)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Milliseconds per simulated second of install work (overrides the config file)
    #[arg(long, global = true)]
    pub tick_ms: Option<u64>,

    /// Write tracing output to this file.
    ///
    /// The TUI owns the terminal, so without a log file interactive runs
    /// discard log output. Headless runs log to stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the installer (interactive unless --plan is given)
    Install {
        /// Install plan to run headless (skips the TUI)
        #[arg(short, long)]
        plan: Option<PathBuf>,

        /// Save the plan built in the TUI to this file before installing
        #[arg(long, conflicts_with = "plan")]
        save_plan: Option<PathBuf>,

        /// Inject a fault into the given stage (0-based) for failure drills
        #[arg(long, hide = true)]
        fail_at_stage: Option<usize>,
    },
    /// Validate an install plan file
    Validate {
        /// Path to the plan file to validate
        plan: PathBuf,
    },
    /// List the configured install stages and total estimated time
    Stages,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
