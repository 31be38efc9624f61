//! Error handling module for the Wave installer
//!
//! Provides the crate-level error type. Each core module defines its own
//! typed error (validation, wizard navigation, pipeline state, stage faults)
//! and converts into [`InstallerError`] at the boundary.

use thiserror::Error;

/// Main error type for the Wave installer
#[derive(Error, Debug)]
pub enum InstallerError {
    /// IO errors (file operations, terminal, thread spawn)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Screen data failed validation
    #[error("Validation error on {screen}: {}", reasons.join("; "))]
    Validation { screen: String, reasons: Vec<String> },

    /// A stage of the install pipeline could not complete (always fatal)
    #[error("Stage {stage_index} failed: {cause}")]
    StageFault { stage_index: usize, cause: String },

    /// Malformed pipeline or installer configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Wizard navigation errors (frozen records, out-of-place commands)
    #[error("Wizard error: {0}")]
    Wizard(String),

    /// Pipeline lifecycle transition errors
    #[error("State error: {0}")]
    State(String),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type alias for installer operations
pub type Result<T> = std::result::Result<T, InstallerError>;

impl InstallerError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Returns true for errors the presentation layer recovers from by
    /// re-prompting the user.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Wizard(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InstallerError::configuration("stage list is empty");
        assert_eq!(err.to_string(), "Configuration error: stage list is empty");

        let err = InstallerError::StageFault {
            stage_index: 3,
            cause: "disk vanished".to_string(),
        };
        assert_eq!(err.to_string(), "Stage 3 failed: disk vanished");
    }

    #[test]
    fn test_validation_display_joins_reasons() {
        let err = InstallerError::Validation {
            screen: "User".to_string(),
            reasons: vec!["Username is required".to_string(), "Passwords do not match".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Validation error on User: Username is required; Passwords do not match"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: InstallerError = io_err.into();
        assert!(matches!(err, InstallerError::Io(_)));
    }

    #[test]
    fn test_user_recoverable() {
        assert!(InstallerError::Wizard("frozen".into()).is_user_recoverable());
        assert!(!InstallerError::state("bad transition").is_user_recoverable());
    }
}
