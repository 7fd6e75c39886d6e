//! LogSender - logs each message via tracing (simulated delivery)

use contracts::{ContractError, MessageSender, ResolvedMessage};
use tracing::{info, instrument};

/// Sender that only logs message summaries
pub struct LogSender {
    name: String,
}

impl LogSender {
    /// Create a new LogSender with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_message_summary(&self, message: &ResolvedMessage) {
        info!(
            sender = %self.name,
            channel = message.channel.as_str(),
            to = %message.recipient_address,
            name = %message.display_name,
            subject = message.subject.as_deref().unwrap_or(""),
            body_len = message.body.len(),
            "Message delivered (simulated)"
        );
    }
}

impl MessageSender for LogSender {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sender_send",
        skip(self, message),
        fields(sender = %self.name, to = %message.recipient_address)
    )]
    async fn send(&self, message: &ResolvedMessage) -> Result<(), ContractError> {
        self.log_message_summary(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Channel;

    #[tokio::test]
    async fn test_log_sender_send() {
        let sender = LogSender::new("test_log");
        let message = ResolvedMessage {
            recipient_address: "ada@example.com".to_string(),
            display_name: "Ada".to_string(),
            subject: Some("Hello".to_string()),
            body: "Hi Ada".to_string(),
            channel: Channel::Email,
            from: None,
        };

        assert!(sender.send(&message).await.is_ok());
    }

    #[test]
    fn test_log_sender_name() {
        let sender = LogSender::new("my_logger");
        assert_eq!(sender.name(), "my_logger");
    }
}
