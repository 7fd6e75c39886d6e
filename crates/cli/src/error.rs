//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Campaign file not found
    #[error("Campaign file not found: {path}")]
    ConfigNotFound { path: String },

    /// Command-line overrides made a valid campaign invalid
    #[error("Invalid override: {message}")]
    InvalidOverride { message: String },

    /// Not a single recipient was reached
    #[error("All {failed} sends failed")]
    AllSendsFailed { failed: u64 },

    /// Run stopped by a shutdown signal
    #[error("Dispatch interrupted after {completed} of {total} recipients")]
    Interrupted { completed: u64, total: u64 },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_override(message: impl Into<String>) -> Self {
        Self::InvalidOverride {
            message: message.into(),
        }
    }
}
