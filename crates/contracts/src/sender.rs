//! MessageSender trait - Dispatcher output interface
//!
//! Defines the abstract capability that performs one transmission.

use crate::{ContractError, ResolvedMessage};

/// Message delivery trait
///
/// All sender implementations must implement this trait. Sends within a
/// batch run concurrently against the same sender, hence `&self`.
#[trait_variant::make(MessageSender: Send)]
pub trait LocalMessageSender {
    /// Sender name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Transmit one resolved message
    ///
    /// # Errors
    /// Any error means the message counts as failed; the dispatcher does not
    /// inspect the variant.
    async fn send(&self, message: &ResolvedMessage) -> Result<(), ContractError>;
}
