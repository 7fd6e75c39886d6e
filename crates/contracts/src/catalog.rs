//! Built-in template presets
//!
//! Only `{name}` is ever substituted. Other tokens (`{date}`, `{time}`,
//! `{passId}`, `{status}`) are sent verbatim.

use crate::{Channel, MessageTemplate};

/// A named, ready-to-use template
#[derive(Debug, Clone, Copy)]
pub struct TemplatePreset {
    /// Identifier used in config files (`template.preset`)
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    pub channel: Channel,
    pub subject: Option<&'static str>,
    pub body: &'static str,
}

impl TemplatePreset {
    pub fn to_template(&self) -> MessageTemplate {
        MessageTemplate::new(self.subject.map(str::to_string), self.body)
    }
}

pub const PRESETS: &[TemplatePreset] = &[
    TemplatePreset {
        id: "welcome",
        name: "Welcome Message",
        channel: Channel::Email,
        subject: Some("Welcome to Our Services"),
        body: "Dear {name},\n\nWelcome to our platform! We're excited to have you on board.\n\nBest regards,\nThe Team",
    },
    TemplatePreset {
        id: "meeting_reminder",
        name: "Meeting Reminder",
        channel: Channel::Email,
        subject: Some("Meeting Reminder - {date}"),
        body: "Hi {name},\n\nThis is a friendly reminder about our meeting scheduled for {date} at {time}.\n\nLooking forward to connecting with you!\n\nBest regards",
    },
    TemplatePreset {
        id: "gate_pass_approved",
        name: "Gate Pass Approved",
        channel: Channel::Whatsapp,
        subject: None,
        body: "Hi {name}! Your gate pass for {date} has been approved. Please arrive at the main entrance. Pass ID: {passId}",
    },
    TemplatePreset {
        id: "status_update",
        name: "Status Update",
        channel: Channel::Whatsapp,
        subject: None,
        body: "Hello {name}, your application status has been updated to: {status}. For more details, please contact us.",
    },
];

/// Look up a preset by id (case-insensitive)
pub fn find_preset(id: &str) -> Option<&'static TemplatePreset> {
    PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id))
}
