//! OutboxSender - writes each resolved message to a JSON file

use contracts::{ContractError, MessageSender, ResolvedMessage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, instrument};

/// Configuration for OutboxSender
#[derive(Debug, Clone)]
pub struct OutboxSenderConfig {
    /// Directory receiving one file per message
    pub dir: PathBuf,
}

impl OutboxSenderConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let dir = params
            .get("dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./outbox"));

        Self { dir }
    }
}

/// Sender that persists messages to disk instead of delivering them
pub struct OutboxSender {
    name: String,
    config: OutboxSenderConfig,
    sequence: AtomicU64,
}

impl OutboxSender {
    /// Create a new OutboxSender
    ///
    /// Numbering continues after the highest sequence already in `dir`, so
    /// repeated runs into one outbox never reuse a file name.
    pub fn new(name: impl Into<String>, config: OutboxSenderConfig) -> std::io::Result<Self> {
        std::fs::create_dir_all(&config.dir)?;
        let next = next_free_sequence(&config.dir)?;

        Ok(Self {
            name: name.into(),
            config,
            sequence: AtomicU64::new(next),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, OutboxSenderConfig::from_params(params))
    }

    pub fn dir(&self) -> &PathBuf {
        &self.config.dir
    }

    fn next_path(&self, address: &str) -> PathBuf {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.config
            .dir
            .join(format!("{:06}_{}.json", seq, sanitize_file_stem(address)))
    }
}

/// One past the largest `NNNNNN_` prefix among the `.json` files in `dir`
fn next_free_sequence(dir: &Path) -> std::io::Result<u64> {
    let mut next = 0;
    for entry in std::fs::read_dir(dir)? {
        let file_name = entry?.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if !file_name.ends_with(".json") {
            continue;
        }
        let seq = file_name
            .split_once('_')
            .and_then(|(prefix, _)| prefix.parse::<u64>().ok());
        if let Some(seq) = seq {
            next = next.max(seq + 1);
        }
    }
    Ok(next)
}

/// Keep `[A-Za-z0-9._-]`, map everything else to `_`
fn sanitize_file_stem(address: &str) -> String {
    address
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write `data` to a file that must not exist yet
async fn write_new_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.flush().await
}

impl MessageSender for OutboxSender {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "outbox_sender_send",
        skip(self, message),
        fields(sender = %self.name, to = %message.recipient_address)
    )]
    async fn send(&self, message: &ResolvedMessage) -> Result<(), ContractError> {
        let data = serde_json::to_vec_pretty(message).map_err(|e| {
            ContractError::send_failed(&self.name, &message.recipient_address, e.to_string())
        })?;

        let path = self.next_path(&message.recipient_address);
        write_new_file(&path, &data).await.map_err(|e| {
            error!(sender = %self.name, path = %path.display(), error = %e, "Write failed");
            ContractError::send_failed(&self.name, &message.recipient_address, e.to_string())
        })?;

        debug!(sender = %self.name, path = %path.display(), "Message written");
        Ok(())
    }
}
