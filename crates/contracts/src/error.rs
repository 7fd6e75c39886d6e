//! Layered error definitions
//!
//! Categorized by source: config / template / send

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Template Errors =====
    /// Unknown template preset
    #[error("unknown template preset '{preset}'")]
    UnknownPreset { preset: String },

    // ===== Send Errors =====
    /// Transport-level send failure
    #[error("sender '{sender}' failed for '{recipient}': {message}")]
    SendFailed {
        sender: String,
        recipient: String,
        message: String,
    },

    /// Provider answered with a non-success status
    #[error("sender '{sender}' rejected '{recipient}' with status {status}")]
    SendRejected {
        sender: String,
        recipient: String,
        status: u16,
    },

    /// Send did not settle within the configured timeout
    #[error("sender '{sender}' timed out for '{recipient}' after {waited_ms}ms")]
    SendTimeout {
        sender: String,
        recipient: String,
        waited_ms: u64,
    },

    /// Sender could not be constructed / connected
    #[error("sender '{sender}' setup error: {message}")]
    SenderSetup { sender: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create send failure
    pub fn send_failed(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SendFailed {
            sender: sender.into(),
            recipient: recipient.into(),
            message: message.into(),
        }
    }

    /// Create sender setup error
    pub fn sender_setup(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SenderSetup {
            sender: sender.into(),
            message: message.into(),
        }
    }
}
