//! Wave Installer Library
//!
//! Wizard navigation, validation, install plan and the simulated install
//! pipeline behind the Wave OS terminal installer.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod install_state;
pub mod inventory;
pub mod pipeline;
pub mod plan;
pub mod progress;
pub mod record;
pub mod theme;
pub mod types;
pub mod ui;
pub mod validation;
pub mod wizard;

// Re-export main types for convenience
pub use config::InstallerConfig;
pub use error::{InstallerError, Result};
pub use install_state::{PipelineState, RunContext, StateTransitionError};
pub use inventory::{DeviceInventory, DiskInfo, MockInventory, NetworkInfo};
pub use pipeline::{
    ConfigurationError, InstallPipeline, PipelineHandle, PipelineOptions, PipelineOutcome,
    ProgressEvent, SimulatedBackend, Stage, StageBackend, StageContext, StageFault,
};
pub use plan::InstallPlan;
pub use progress::{ConsoleSink, ProgressSink, ProgressView};
pub use record::ScreenRecord;
pub use types::{ConnectionType, PartitionScheme, ScreenId};
pub use validation::{PasswordStrength, ValidationError, ValidationIssue, ValidationResult};
pub use wizard::{Transition, WizardCommand, WizardController, WizardError};
