//! # Contracts
//!
//! Frozen interface contracts shared by every outreach crate: recipients,
//! message templates, dispatch outcomes, the `MessageSender` capability and
//! the campaign configuration blueprint.
//! Business crates depend on this crate only; reverse dependencies are prohibited.

mod blueprint;
mod catalog;
mod error;
mod message;
mod outcome;
mod recipient;
mod sender;

pub use blueprint::*;
pub use catalog::{find_preset, TemplatePreset, PRESETS};
pub use error::*;
pub use message::*;
pub use outcome::*;
pub use recipient::Recipient;
pub use sender::{LocalMessageSender, MessageSender};
