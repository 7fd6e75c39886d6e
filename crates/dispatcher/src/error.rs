//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Individual send failures are never surfaced here; they are folded into
/// the `DispatchSummary`.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Batch size must be positive
    #[error("invalid batch size {batch_size}: must be > 0")]
    InvalidBatchSize { batch_size: usize },

    /// Sender creation error
    #[error("failed to create sender '{name}': {message}")]
    SenderCreation { name: String, message: String },

    /// Background dispatch task died
    #[error("dispatch worker failed: {message}")]
    Worker { message: String },

    /// Contract error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sender creation error
    pub fn sender_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SenderCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
