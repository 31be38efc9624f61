//! Installer configuration
//!
//! Pacing, queue sizing and the stage list, loaded from an optional JSON
//! file. Every field has a default, so a partial file (or none at all) is
//! valid. Command-line flags override file values.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pipeline::{PipelineOptions, Stage};

/// The install stages shipped with Wave OS, in order.
pub fn default_stages() -> Vec<Stage> {
    [
        ("Preparing installation", 2),
        ("Partitioning disk", 3),
        ("Formatting partitions", 2),
        ("Installing base system", 15),
        ("Installing kernel", 5),
        ("Installing bootloader", 3),
        ("Configuring system", 4),
        ("Installing packages", 8),
        ("Setting up user account", 2),
        ("Finalizing installation", 3),
    ]
    .into_iter()
    .map(|(name, secs)| Stage::new(name, secs))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Milliseconds slept per simulated second of stage work
    pub tick_interval_ms: u64,
    /// Bound of the worker → UI event queue
    pub queue_capacity: usize,
    pub stages: Vec<Stage>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            queue_capacity: 64,
            stages: default_stages(),
        }
    }
}

impl InstallerConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).with_context(|| {
            format!("Failed to read installer configuration from {:?}", path.as_ref())
        })?;

        let config: Self = serde_json::from_str(&content)
            .context("Failed to parse installer configuration JSON")?;

        info!(
            path = %path.as_ref().display(),
            stages = config.stages.len(),
            "Loaded installer configuration"
        );
        Ok(config)
    }

    /// Load `path` when given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply a `--tick-ms` override.
    pub fn with_tick_interval_ms(mut self, tick_ms: Option<u64>) -> Self {
        if let Some(ms) = tick_ms {
            self.tick_interval_ms = ms;
        }
        self
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            queue_capacity: self.queue_capacity,
        }
    }
}
