//! Install pipeline
//!
//! Runs the ordered install stages on one dedicated worker thread and
//! reports progress through a bounded FIFO queue. The foreground never
//! blocks on the worker: it drains delivered events with
//! [`PipelineHandle::drain`] from its render loop, or blocks on
//! [`PipelineHandle::wait`] in headless mode.
//!
//! # Event order
//!
//! For each stage `i`:
//!
//! ```text
//! StageStarted{i} → LogLine("Starting: …") → ProgressTick × duration
//!                 → LogLine("Completed: …") → StageCompleted{i}
//! ```
//!
//! followed by exactly one terminal event, `PipelineCompleted` or
//! `PipelineFailed`. The run context is moved to its terminal state before
//! the terminal event is sent.

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::InstallerError;
use crate::install_state::{PipelineState, RunContext};
use crate::plan::InstallPlan;
use crate::progress::ProgressSink;

/// Failure reason recorded when the progress receiver goes away mid-run.
pub const CONSUMER_DISCONNECTED: &str = "progress consumer disconnected";

/// One named unit of install work with an estimated duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub estimated_duration_secs: u32,
}

impl Stage {
    pub fn new(name: impl Into<String>, estimated_duration_secs: u32) -> Self {
        Self {
            name: name.into(),
            estimated_duration_secs,
        }
    }
}

/// Sum of all stage durations in seconds.
pub fn total_duration_secs(stages: &[Stage]) -> u64 {
    stages
        .iter()
        .map(|s| u64::from(s.estimated_duration_secs))
        .sum()
}

/// Render a remaining-time estimate: `"{m}m {s}s"` from one minute up,
/// otherwise `"{s}s"`.
pub fn format_remaining(secs: u64) -> String {
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

/// Progress notification sent from the worker to the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    StageStarted {
        index: usize,
        name: String,
    },
    ProgressTick {
        elapsed_secs: u64,
        percent: u8,
        remaining_secs: u64,
    },
    LogLine {
        timestamp: DateTime<Local>,
        text: String,
    },
    StageCompleted {
        index: usize,
        name: String,
    },
    PipelineCompleted,
    PipelineFailed {
        reason: String,
    },
}

impl ProgressEvent {
    /// A log line stamped with the current local time.
    pub fn log(text: impl Into<String>) -> Self {
        Self::LogLine {
            timestamp: Local::now(),
            text: text.into(),
        }
    }

    /// True for `PipelineCompleted` and `PipelineFailed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PipelineCompleted | Self::PipelineFailed { .. })
    }
}

/// Final result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Completed,
    Failed { reason: String },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A stage could not complete. Always fatal to the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("stage {stage_index} failed: {cause}")]
pub struct StageFault {
    pub stage_index: usize,
    pub cause: String,
}

impl StageFault {
    pub fn new(stage_index: usize, cause: impl Into<String>) -> Self {
        Self {
            stage_index,
            cause: cause.into(),
        }
    }
}

impl From<StageFault> for InstallerError {
    fn from(fault: StageFault) -> Self {
        InstallerError::StageFault {
            stage_index: fault.stage_index,
            cause: fault.cause,
        }
    }
}

/// Malformed stage list or pipeline options. Detected before any thread starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("stage list is empty")]
    EmptyStageList,

    #[error("stage {index} ('{name}') has a zero duration")]
    ZeroDuration { index: usize, name: String },

    #[error("stage {index} has a blank name")]
    BlankStageName { index: usize },

    #[error("progress queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("fault stage {index} is out of range for {stage_count} stages")]
    FaultStageOutOfRange { index: usize, stage_count: usize },
}

impl From<ConfigurationError> for InstallerError {
    fn from(err: ConfigurationError) -> Self {
        InstallerError::Configuration(err.to_string())
    }
}

/// Reject a fault index that names no stage in `stages`.
pub fn check_fault_stage(stages: &[Stage], fail_at: Option<usize>) -> Result<(), ConfigurationError> {
    match fail_at {
        Some(index) if index >= stages.len() => Err(ConfigurationError::FaultStageOutOfRange {
            index,
            stage_count: stages.len(),
        }),
        _ => Ok(()),
    }
}

/// What a backend sees for one second of stage work.
#[derive(Debug)]
pub struct StageContext<'a> {
    pub index: usize,
    pub stage: &'a Stage,
    /// Zero-based second within the stage
    pub slice: u32,
    pub plan: &'a InstallPlan,
}

/// The component that performs stage work: a disk partitioner, package
/// manager, bootloader installer. Invoked once per second of stage time on
/// the worker thread.
pub trait StageBackend: Send {
    fn run_slice(&mut self, ctx: &StageContext<'_>) -> Result<(), StageFault>;
}

/// Backend that performs no work. Optionally faults on the first slice of
/// one stage.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    fail_at: Option<usize>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fault when stage `index` runs its first slice.
    pub fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
        }
    }
}

impl StageBackend for SimulatedBackend {
    fn run_slice(&mut self, ctx: &StageContext<'_>) -> Result<(), StageFault> {
        if self.fail_at == Some(ctx.index) && ctx.slice == 0 {
            return Err(StageFault::new(ctx.index, "simulated fault injected"));
        }
        Ok(())
    }
}

/// Pacing and queue sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Sleep before each one-second slice; zero runs flat out
    pub tick_interval: Duration,
    pub queue_capacity: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            queue_capacity: 64,
        }
    }
}

/// A validated, not yet started install run.
#[derive(Debug)]
pub struct InstallPipeline {
    stages: Vec<Stage>,
    plan: InstallPlan,
    options: PipelineOptions,
    total_secs: u64,
}

impl InstallPipeline {
    /// Validate the stage list and options.
    ///
    /// # Errors
    ///
    /// Any [`ConfigurationError`]: empty list, blank name, zero duration,
    /// zero queue capacity.
    pub fn new(
        stages: Vec<Stage>,
        plan: InstallPlan,
        options: PipelineOptions,
    ) -> Result<Self, ConfigurationError> {
        if stages.is_empty() {
            return Err(ConfigurationError::EmptyStageList);
        }
        for (index, stage) in stages.iter().enumerate() {
            if stage.name.trim().is_empty() {
                return Err(ConfigurationError::BlankStageName { index });
            }
            if stage.estimated_duration_secs == 0 {
                return Err(ConfigurationError::ZeroDuration {
                    index,
                    name: stage.name.clone(),
                });
            }
        }
        if options.queue_capacity == 0 {
            return Err(ConfigurationError::ZeroQueueCapacity);
        }

        let total_secs = total_duration_secs(&stages);
        Ok(Self {
            stages,
            plan,
            options,
            total_secs,
        })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn total_duration_secs(&self) -> u64 {
        self.total_secs
    }

    /// Simulated backend for this run, faulting at `fail_at` when given.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::FaultStageOutOfRange`] when `fail_at` names no stage.
    pub fn simulated_backend(
        &self,
        fail_at: Option<usize>,
    ) -> Result<SimulatedBackend, ConfigurationError> {
        check_fault_stage(&self.stages, fail_at)?;
        Ok(match fail_at {
            Some(index) => SimulatedBackend::failing_at(index),
            None => SimulatedBackend::new(),
        })
    }

    /// Move to `Running` and spawn the worker.
    pub fn start<B>(self, backend: B) -> Result<PipelineHandle, InstallerError>
    where
        B: StageBackend + 'static,
    {
        let context = Arc::new(Mutex::new(RunContext::new()));
        lock(&context).start()?;

        let (tx, rx) = mpsc::sync_channel(self.options.queue_capacity);
        info!(
            stages = self.stages.len(),
            total_secs = self.total_secs,
            "Starting install pipeline"
        );

        let worker = Worker {
            stages: self.stages,
            plan: self.plan,
            tick: self.options.tick_interval,
            total_secs: self.total_secs,
            tx,
            context: Arc::clone(&context),
        };

        let spawned = thread::Builder::new()
            .name("install-worker".to_string())
            .spawn(move || worker.run(backend));

        match spawned {
            Ok(join) => Ok(PipelineHandle {
                rx,
                context,
                worker: Some(join),
                finished: false,
            }),
            Err(e) => {
                let _ = lock(&context).fail(format!("could not spawn install worker: {}", e));
                Err(e.into())
            }
        }
    }
}

fn lock(context: &Mutex<RunContext>) -> MutexGuard<'_, RunContext> {
    // A panicked worker leaves the last recorded state intact
    context.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Halt {
    Disconnected,
    Fault { stage: String, fault: StageFault },
}

struct Worker {
    stages: Vec<Stage>,
    plan: InstallPlan,
    tick: Duration,
    total_secs: u64,
    tx: SyncSender<ProgressEvent>,
    context: Arc<Mutex<RunContext>>,
}

impl Worker {
    fn run<B: StageBackend>(self, mut backend: B) {
        match self.execute(&mut backend) {
            Ok(()) => {
                self.transition(|ctx| ctx.complete());
                info!("Install pipeline completed");
                if self.tx.send(ProgressEvent::PipelineCompleted).is_err() {
                    debug!("Consumer gone before completion was delivered");
                }
            }
            Err(Halt::Fault { stage, fault }) => {
                let reason = format!("{}: {}", stage, fault.cause);
                warn!(stage_index = fault.stage_index, %reason, "Install stage faulted");
                // The fault is recorded even if the consumer has already left
                let _ = self.tx.send(ProgressEvent::log(format!("Failed: {}", reason)));
                self.transition(|ctx| ctx.fail(reason.clone()));
                let _ = self.tx.send(ProgressEvent::PipelineFailed { reason });
            }
            Err(Halt::Disconnected) => {
                warn!("Progress consumer disconnected; stopping install worker");
                self.transition(|ctx| ctx.fail(CONSUMER_DISCONNECTED));
            }
        }
    }

    fn execute<B: StageBackend>(&self, backend: &mut B) -> Result<(), Halt> {
        let mut elapsed = 0u64;

        for (index, stage) in self.stages.iter().enumerate() {
            self.transition(|ctx| ctx.enter_stage(index));
            info!(index, stage = %stage.name, "Stage started");

            self.emit(ProgressEvent::StageStarted {
                index,
                name: stage.name.clone(),
            })?;
            self.emit(ProgressEvent::log(format!("Starting: {}", stage.name)))?;

            for slice in 0..stage.estimated_duration_secs {
                if !self.tick.is_zero() {
                    thread::sleep(self.tick);
                }

                let ctx = StageContext {
                    index,
                    stage,
                    slice,
                    plan: &self.plan,
                };
                backend.run_slice(&ctx).map_err(|fault| Halt::Fault {
                    stage: stage.name.clone(),
                    fault,
                })?;

                elapsed += 1;
                self.emit(ProgressEvent::ProgressTick {
                    elapsed_secs: elapsed,
                    percent: percent_of(elapsed, self.total_secs),
                    remaining_secs: self.total_secs.saturating_sub(elapsed),
                })?;
            }

            self.emit(ProgressEvent::log(format!("Completed: {}", stage.name)))?;
            self.emit(ProgressEvent::StageCompleted {
                index,
                name: stage.name.clone(),
            })?;
        }

        Ok(())
    }

    fn emit(&self, event: ProgressEvent) -> Result<(), Halt> {
        self.tx.send(event).map_err(|_| Halt::Disconnected)
    }

    fn transition<F, E>(&self, apply: F)
    where
        F: FnOnce(&mut RunContext) -> Result<(), E>,
        E: std::fmt::Display,
    {
        if let Err(e) = apply(&mut lock(&self.context)) {
            warn!("Ignored pipeline transition: {}", e);
        }
    }
}

fn percent_of(elapsed: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (elapsed.min(total) * 100 / total) as u8
}

/// Foreground side of a running pipeline.
#[derive(Debug)]
pub struct PipelineHandle {
    rx: Receiver<ProgressEvent>,
    context: Arc<Mutex<RunContext>>,
    worker: Option<JoinHandle<()>>,
    finished: bool,
}

impl PipelineHandle {
    /// Deliver every event already queued, without blocking.
    /// Returns the number of events delivered.
    pub fn drain<S: ProgressSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let mut delivered = 0;
        while !self.finished {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.finished = event.is_terminal();
                    sink.on_event(event);
                    delivered += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.finished = true,
            }
        }
        delivered
    }

    /// Block until the terminal event, delivering everything on the way.
    pub fn wait<S: ProgressSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<PipelineOutcome, InstallerError> {
        while !self.finished {
            match self.rx.recv() {
                Ok(event) => {
                    self.finished = event.is_terminal();
                    sink.on_event(event);
                }
                Err(_) => self.finished = true,
            }
        }
        self.join()?;
        self.outcome()
            .ok_or_else(|| InstallerError::state("install worker exited without a terminal state"))
    }

    pub fn state(&self) -> PipelineState {
        lock(&self.context).state()
    }

    /// `None` until the run reaches a terminal state.
    pub fn outcome(&self) -> Option<PipelineOutcome> {
        let ctx = lock(&self.context);
        match ctx.state() {
            PipelineState::Completed => Some(PipelineOutcome::Completed),
            PipelineState::Failed => Some(PipelineOutcome::Failed {
                reason: ctx.failure_reason().unwrap_or("unknown failure").to_string(),
            }),
            PipelineState::Idle | PipelineState::Running => None,
        }
    }

    /// True once the terminal event has been delivered or the worker is gone.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for the worker thread to exit.
    pub fn join(&mut self) -> Result<(), InstallerError> {
        match self.worker.take() {
            Some(join) => join
                .join()
                .map_err(|_| InstallerError::state("install worker panicked")),
            None => Ok(()),
        }
    }
}
