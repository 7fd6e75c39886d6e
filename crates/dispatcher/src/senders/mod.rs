//! Sender implementations
//!
//! Contains LogSender, OutboxSender, and RelaySender, plus the factory that
//! builds one from a `SenderConfig`.

mod log;
mod outbox;
mod relay;

pub use self::log::LogSender;
pub use self::outbox::{OutboxSender, OutboxSenderConfig};
pub use self::relay::{RelaySender, RelaySenderConfig, DEFAULT_RELAY_ENDPOINT};

use contracts::{ContractError, MessageSender, ResolvedMessage, SenderConfig, SenderType};
use tracing::instrument;

use crate::error::DispatcherError;

/// Sender selected by configuration
pub enum ConfiguredSender {
    Log(LogSender),
    Outbox(OutboxSender),
    Relay(RelaySender),
}

impl MessageSender for ConfiguredSender {
    fn name(&self) -> &str {
        match self {
            Self::Log(sender) => sender.name(),
            Self::Outbox(sender) => sender.name(),
            Self::Relay(sender) => sender.name(),
        }
    }

    async fn send(&self, message: &ResolvedMessage) -> Result<(), ContractError> {
        match self {
            Self::Log(sender) => sender.send(message).await,
            Self::Outbox(sender) => sender.send(message).await,
            Self::Relay(sender) => sender.send(message).await,
        }
    }
}

/// Create a sender from configuration
#[instrument(
    name = "dispatcher_create_sender",
    skip(config),
    fields(sender = %config.name, sender_type = ?config.sender_type)
)]
pub fn create_sender(config: &SenderConfig) -> Result<ConfiguredSender, DispatcherError> {
    match config.sender_type {
        SenderType::Log => Ok(ConfiguredSender::Log(LogSender::new(&config.name))),
        SenderType::Outbox => {
            let sender = OutboxSender::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sender_creation(&config.name, e.to_string()))?;
            Ok(ConfiguredSender::Outbox(sender))
        }
        SenderType::Relay => {
            let sender = RelaySender::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sender_creation(&config.name, e.to_string()))?;
            Ok(ConfiguredSender::Relay(sender))
        }
    }
}
