//! Recipient - one addressable contact in a dispatch

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Message target
///
/// `address` is opaque to the dispatcher: an email address for the email
/// channel, a phone number for WhatsApp/SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Recipient {
    /// Contact identifier
    #[validate(length(min = 1, message = "recipient address cannot be empty"))]
    pub address: String,

    /// Name substituted for `{name}`
    pub display_name: String,
}

impl Recipient {
    pub fn new(address: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: display_name.into(),
        }
    }
}
