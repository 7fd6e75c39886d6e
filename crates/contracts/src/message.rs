//! Message templates and resolved messages
//!
//! A `MessageTemplate` is rendered once per recipient into a `ResolvedMessage`,
//! which is what a `MessageSender` receives.

use serde::{Deserialize, Serialize};

/// Placeholder replaced with the recipient's display name
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Email,
    Whatsapp,
    Sms,
}

impl Channel {
    /// Whether messages on this channel carry a subject line
    pub fn has_subject(self) -> bool {
        matches!(self, Self::Email)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Whatsapp => "whatsapp",
            Self::Sms => "sms",
        }
    }
}

/// How many occurrences of a placeholder get substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderMode {
    /// Only the first occurrence
    #[default]
    First,
    /// Every occurrence
    All,
}

/// Templated payload shared by every recipient of a dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    /// Subject line (absent for non-email channels)
    #[serde(default)]
    pub subject: Option<String>,

    /// Body containing placeholder tokens such as `{name}`
    pub body: String,

    #[serde(default)]
    pub placeholder_mode: PlaceholderMode,
}

impl MessageTemplate {
    pub fn new(subject: Option<String>, body: impl Into<String>) -> Self {
        Self {
            subject,
            body: body.into(),
            placeholder_mode: PlaceholderMode::default(),
        }
    }

    pub fn with_placeholder_mode(mut self, mode: PlaceholderMode) -> Self {
        self.placeholder_mode = mode;
        self
    }
}

/// Originator shown to the recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderIdentity {
    pub name: String,
    pub email: String,
}

/// Fully rendered message for a single recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMessage {
    pub recipient_address: String,
    pub display_name: String,
    pub subject: Option<String>,
    pub body: String,
    #[serde(default)]
    pub channel: Channel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<SenderIdentity>,
}
