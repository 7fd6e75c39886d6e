//! # Dispatcher
//!
//! 群发分发模块。
//!
//! 负责：
//! - 将收件人按固定大小分批
//! - 批内并发发送，批间屏障 + 固定间隔限速
//! - 汇总成功/失败计数，单条失败不影响同批其他发送

pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod senders;
pub mod template;

pub use contracts::{DispatchSummary, MessageSender, Recipient};
pub use dispatcher::{
    dispatch, BatchDispatcher, BatchReport, DispatchConfig, DEFAULT_BATCH_SIZE,
    DEFAULT_INTER_BATCH_DELAY,
};
pub use error::DispatcherError;
pub use handle::{DispatchHandle, DispatchProgress};
pub use senders::{create_sender, ConfiguredSender, LogSender, OutboxSender, RelaySender};
pub use template::{render_message, substitute};
