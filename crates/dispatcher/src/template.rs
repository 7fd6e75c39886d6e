//! Placeholder substitution

use contracts::{
    Channel, MessageTemplate, PlaceholderMode, Recipient, ResolvedMessage, SenderIdentity,
    NAME_PLACEHOLDER,
};

/// Literal token replacement, no escaping or parsing
pub fn substitute(text: &str, token: &str, value: &str, mode: PlaceholderMode) -> String {
    match mode {
        PlaceholderMode::First => text.replacen(token, value, 1),
        PlaceholderMode::All => text.replace(token, value),
    }
}

/// Render the template for one recipient
///
/// Only `{name}` is substituted, and only in the body. The subject is kept
/// for channels that carry one.
pub fn render_message(
    template: &MessageTemplate,
    recipient: &Recipient,
    channel: Channel,
    from: Option<&SenderIdentity>,
) -> ResolvedMessage {
    let body = substitute(
        &template.body,
        NAME_PLACEHOLDER,
        &recipient.display_name,
        template.placeholder_mode,
    );

    ResolvedMessage {
        recipient_address: recipient.address.clone(),
        display_name: recipient.display_name.clone(),
        subject: template.subject.clone().filter(|_| channel.has_subject()),
        body,
        channel,
        from: from.cloned(),
    }
}
