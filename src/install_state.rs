//! Install pipeline lifecycle state machine
//!
//! The [`RunContext`] is the single source of truth for where an install run
//! is in its lifecycle. The worker thread drives it; the foreground reads it
//! through the pipeline handle.
//!
//! # State Flow
//!
//! ```text
//! Idle
//!   ↓ start()
//! Running ──fail()──→ Failed
//!   ↓ complete()
//! Completed
//! ```
//!
//! `Completed` and `Failed` are terminal. Nothing leads back to `Idle`.

use std::fmt;

use chrono::{DateTime, Local};
use thiserror::Error;

/// Lifecycle state of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Constructed, worker not started
    Idle,
    /// Worker is executing stages
    Running,
    /// Every stage finished (terminal)
    Completed,
    /// A stage faulted or the consumer went away (terminal)
    Failed,
}

impl PipelineState {
    /// Returns true if this is a terminal state (Completed or Failed)
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Idle => "Waiting to start",
            Self::Running => "Installing",
            Self::Completed => "Installation complete",
            Self::Failed => "Installation failed",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during lifecycle transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateTransitionError {
    /// Attempted to transition out of Completed or Failed
    #[error("Cannot transition from terminal state {from} (installation is {})", if *from == PipelineState::Completed { "complete" } else { "failed" })]
    FromTerminalState { from: PipelineState },

    /// Attempted to finish a run that never started
    #[error("Cannot move to {to}: pipeline is {from}, not running")]
    NotRunning {
        from: PipelineState,
        to: PipelineState,
    },

    /// Attempted to start a run twice
    #[error("Pipeline is already running")]
    AlreadyRunning,
}

/// Context for tracking one pipeline run.
///
/// # Example
///
/// ```
/// use wave_installer::install_state::{PipelineState, RunContext};
///
/// let mut ctx = RunContext::new();
/// ctx.start().unwrap();
/// assert_eq!(ctx.state(), PipelineState::Running);
///
/// ctx.fail("disk vanished").unwrap();
/// assert_eq!(ctx.failure_reason(), Some("disk vanished"));
/// assert!(ctx.start().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RunContext {
    state: PipelineState,
    failure_reason: Option<String>,
    /// Stage being executed; `None` before the first stage starts
    current_stage: Option<usize>,
    history: Vec<(PipelineState, DateTime<Local>)>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            failure_reason: None,
            current_stage: None,
            history: Vec::with_capacity(3),
        }
    }

    #[inline]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    #[inline]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    #[inline]
    pub fn current_stage(&self) -> Option<usize> {
        self.current_stage
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == PipelineState::Running
    }

    /// Transition history with local timestamps
    pub fn history(&self) -> &[(PipelineState, DateTime<Local>)] {
        &self.history
    }

    /// Idle → Running
    pub fn start(&mut self) -> Result<(), StateTransitionError> {
        match self.state {
            PipelineState::Idle => {
                self.record(PipelineState::Running);
                Ok(())
            }
            PipelineState::Running => Err(StateTransitionError::AlreadyRunning),
            from => Err(StateTransitionError::FromTerminalState { from }),
        }
    }

    /// Record that the worker entered stage `index`. Only valid while running.
    pub fn enter_stage(&mut self, index: usize) -> Result<(), StateTransitionError> {
        self.require_running(PipelineState::Running)?;
        self.current_stage = Some(index);
        Ok(())
    }

    /// Running → Completed
    pub fn complete(&mut self) -> Result<(), StateTransitionError> {
        self.require_running(PipelineState::Completed)?;
        self.record(PipelineState::Completed);
        Ok(())
    }

    /// Running → Failed, keeping `reason` for the outcome.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), StateTransitionError> {
        self.require_running(PipelineState::Failed)?;
        self.failure_reason = Some(reason.into());
        self.record(PipelineState::Failed);
        Ok(())
    }

    fn require_running(&self, to: PipelineState) -> Result<(), StateTransitionError> {
        match self.state {
            PipelineState::Running => Ok(()),
            from if from.is_terminal() => Err(StateTransitionError::FromTerminalState { from }),
            from => Err(StateTransitionError::NotRunning { from, to }),
        }
    }

    fn record(&mut self, state: PipelineState) {
        self.history.push((state, Local::now()));
        self.state = state;
    }
}

impl From<StateTransitionError> for crate::error::InstallerError {
    fn from(err: StateTransitionError) -> Self {
        crate::error::InstallerError::State(err.to_string())
    }
}
