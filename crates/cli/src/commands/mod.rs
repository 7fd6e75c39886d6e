//! Command implementations.

mod info;
mod send;
mod templates;
mod validate;

pub use info::run_info;
pub use send::run_send;
pub use templates::run_templates;
pub use validate::run_validate;
