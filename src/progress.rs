//! Progress consumers
//!
//! A [`ProgressSink`] receives every pipeline event exactly once, in order,
//! on the thread that drains the pipeline handle. [`ProgressView`] is the
//! render model the TUI draws from; [`ConsoleSink`] prints the stream for
//! headless runs.

use std::collections::VecDeque;
use std::io::Write;

use crate::pipeline::{PipelineOutcome, ProgressEvent, format_remaining};

/// Maximum log lines kept by [`ProgressView`].
pub const LOG_CAPACITY: usize = 100;

/// Foreground consumer of the progress event stream.
pub trait ProgressSink {
    fn on_event(&mut self, event: ProgressEvent);
}

/// Collects events verbatim. Used by tests and for post-mortem inspection.
impl ProgressSink for Vec<ProgressEvent> {
    fn on_event(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

fn format_log_line(event: &ProgressEvent) -> Option<String> {
    match event {
        ProgressEvent::LogLine { timestamp, text } => {
            Some(format!("[{}] {}", timestamp.format("%H:%M:%S"), text))
        }
        _ => None,
    }
}

/// Everything the install screen shows.
#[derive(Debug, Clone)]
pub struct ProgressView {
    stage_count: usize,
    total_secs: u64,
    current_stage: Option<String>,
    stages_completed: usize,
    elapsed_secs: u64,
    percent: u8,
    remaining_secs: u64,
    log: VecDeque<String>,
    outcome: Option<PipelineOutcome>,
}

impl ProgressView {
    pub fn new(stage_count: usize, total_secs: u64) -> Self {
        Self {
            stage_count,
            total_secs,
            current_stage: None,
            stages_completed: 0,
            elapsed_secs: 0,
            percent: 0,
            remaining_secs: total_secs,
            log: VecDeque::with_capacity(LOG_CAPACITY),
            outcome: None,
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// e.g. `"Time remaining: 1m 5s"`
    pub fn remaining_text(&self) -> String {
        format!("Time remaining: {}", format_remaining(self.remaining_secs))
    }

    pub fn current_stage(&self) -> Option<&str> {
        self.current_stage.as_deref()
    }

    pub fn stages_completed(&self) -> usize {
        self.stages_completed
    }

    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn log_lines(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.log.iter().map(String::as_str)
    }

    pub fn outcome(&self) -> Option<&PipelineOutcome> {
        self.outcome.as_ref()
    }

    /// True once a terminal event arrived; the view no longer changes.
    pub fn is_frozen(&self) -> bool {
        self.outcome.is_some()
    }

    /// Short status for the gauge title.
    pub fn status_text(&self) -> String {
        match (&self.outcome, &self.current_stage) {
            (Some(PipelineOutcome::Completed), _) => "Installation complete!".to_string(),
            (Some(PipelineOutcome::Failed { reason }), _) => {
                format!("Installation failed: {}", reason)
            }
            (None, Some(stage)) => format!("{}...", stage),
            (None, None) => "Preparing installation...".to_string(),
        }
    }

    fn push_log(&mut self, line: String) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }
}

impl ProgressSink for ProgressView {
    fn on_event(&mut self, event: ProgressEvent) {
        if self.is_frozen() {
            return;
        }

        if let Some(line) = format_log_line(&event) {
            self.push_log(line);
            return;
        }

        match event {
            ProgressEvent::StageStarted { name, .. } => self.current_stage = Some(name),
            ProgressEvent::ProgressTick {
                elapsed_secs,
                percent,
                remaining_secs,
            } => {
                self.elapsed_secs = elapsed_secs;
                self.percent = percent;
                self.remaining_secs = remaining_secs;
            }
            ProgressEvent::StageCompleted { .. } => self.stages_completed += 1,
            ProgressEvent::PipelineCompleted => {
                self.percent = 100;
                self.remaining_secs = 0;
                self.outcome = Some(PipelineOutcome::Completed);
            }
            ProgressEvent::PipelineFailed { reason } => {
                self.outcome = Some(PipelineOutcome::Failed { reason });
            }
            ProgressEvent::LogLine { .. } => {}
        }
    }
}

/// Prints log lines and stage progress for headless installs.
#[derive(Debug)]
pub struct ConsoleSink<W: Write> {
    out: W,
    total_stages: usize,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, total_stages: usize) -> Self {
        Self { out, total_stages }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressSink for ConsoleSink<W> {
    fn on_event(&mut self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::LogLine { .. } => format_log_line(&event),
            ProgressEvent::StageStarted { index, name } => Some(format!(
                "==> [{}/{}] {}",
                index + 1,
                self.total_stages,
                name
            )),
            ProgressEvent::StageCompleted { .. } | ProgressEvent::ProgressTick { .. } => None,
            ProgressEvent::PipelineCompleted => Some("Installation complete!".to_string()),
            ProgressEvent::PipelineFailed { reason } => {
                Some(format!("Installation failed: {}", reason))
            }
        };

        if let Some(line) = line {
            if let Err(e) = writeln!(self.out, "{}", line) {
                tracing::warn!("Failed to write progress line: {}", e);
            }
        }
    }
}
