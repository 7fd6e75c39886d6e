//! BatchDispatcher - rate-limited fan-out of one template to many recipients

use std::time::Duration;

use futures::future::join_all;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, instrument, warn};

use contracts::{
    CampaignBlueprint, Channel, ContractError, DispatchOutcome, DispatchSettings, DispatchStatus,
    DispatchSummary, MessageSender, MessageTemplate, Recipient, SenderIdentity,
};

use crate::error::DispatcherError;
use crate::template::render_message;

/// Recipients per batch when not configured
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Pause between batches when not configured
pub const DEFAULT_INTER_BATCH_DELAY: Duration = Duration::from_secs(1);

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum recipients sent concurrently, must be > 0
    pub batch_size: usize,
    /// Pause inserted between consecutive batches (not after the last)
    pub inter_batch_delay: Duration,
    /// Per-send limit; a send exceeding it counts as failed. None = wait forever
    pub send_timeout: Option<Duration>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay: DEFAULT_INTER_BATCH_DELAY,
            send_timeout: None,
        }
    }
}

impl DispatchConfig {
    /// Build from the config file section
    pub fn from_settings(settings: &DispatchSettings) -> Self {
        Self {
            batch_size: settings.batch_size,
            inter_batch_delay: Duration::from_millis(settings.inter_batch_delay_ms),
            send_timeout: settings.send_timeout_ms.map(Duration::from_millis),
        }
    }

    fn validate(&self) -> Result<(), DispatcherError> {
        if self.batch_size == 0 {
            return Err(DispatcherError::InvalidBatchSize {
                batch_size: self.batch_size,
            });
        }
        Ok(())
    }
}

/// What a caller sees after each batch barrier
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Zero-based batch index
    pub index: usize,
    pub total_batches: usize,
    /// Outcomes in recipient order
    pub outcomes: Vec<DispatchOutcome>,
    /// Counts for this batch only
    pub summary: DispatchSummary,
    /// Time from first send to barrier
    pub elapsed: Duration,
}

/// Batch dispatcher
///
/// Stateless between calls: every `dispatch` is an independent run.
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    config: DispatchConfig,
    channel: Channel,
    from: Option<SenderIdentity>,
}

impl BatchDispatcher {
    /// Create a dispatcher, rejecting a zero batch size
    pub fn new(config: DispatchConfig) -> Result<Self, DispatcherError> {
        config.validate()?;
        Ok(Self {
            config,
            channel: Channel::default(),
            from: None,
        })
    }

    /// Create a dispatcher for a loaded campaign
    pub fn from_blueprint(blueprint: &CampaignBlueprint) -> Result<Self, DispatcherError> {
        Ok(Self::new(DispatchConfig::from_settings(&blueprint.dispatch))?
            .with_channel(blueprint.campaign.channel)
            .with_sender_identity(blueprint.sender_identity()))
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_sender_identity(mut self, from: Option<SenderIdentity>) -> Self {
        self.from = from;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Number of batches `recipient_count` recipients split into
    pub fn batch_count(&self, recipient_count: usize) -> usize {
        recipient_count.div_ceil(self.config.batch_size)
    }

    /// Send `template` to every recipient and return the aggregate counts
    pub async fn dispatch<S>(
        &self,
        recipients: &[Recipient],
        template: &MessageTemplate,
        sender: &S,
    ) -> DispatchSummary
    where
        S: MessageSender + Sync,
    {
        self.dispatch_observed(recipients, template, sender, |_| {})
            .await
    }

    /// Like [`dispatch`](Self::dispatch), reporting every batch once its
    /// barrier completes
    #[instrument(
        name = "batch_dispatch",
        skip_all,
        fields(
            sender = %sender.name(),
            recipients = recipients.len(),
            batch_size = self.config.batch_size
        )
    )]
    pub async fn dispatch_observed<S, F>(
        &self,
        recipients: &[Recipient],
        template: &MessageTemplate,
        sender: &S,
        mut on_batch: F,
    ) -> DispatchSummary
    where
        S: MessageSender + Sync,
        F: FnMut(&BatchReport),
    {
        let total_batches = self.batch_count(recipients.len());
        let mut summary = DispatchSummary::default();

        info!(batches = total_batches, "Dispatch started");

        for (index, batch) in recipients.chunks(self.config.batch_size).enumerate() {
            let started = Instant::now();

            let sends = batch
                .iter()
                .map(|recipient| self.send_one(recipient, template, sender));
            let outcomes = join_all(sends).await;

            let mut batch_summary = DispatchSummary::default();
            for outcome in &outcomes {
                batch_summary.record(outcome.status);
            }
            summary.merge(batch_summary);

            let report = BatchReport {
                index,
                total_batches,
                outcomes,
                summary: batch_summary,
                elapsed: started.elapsed(),
            };
            debug!(
                batch = index + 1,
                of = total_batches,
                success = batch_summary.success_count,
                failed = batch_summary.failed_count,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Batch settled"
            );
            on_batch(&report);

            let is_last = index + 1 == total_batches;
            if !is_last && !self.config.inter_batch_delay.is_zero() {
                sleep(self.config.inter_batch_delay).await;
            }
        }

        info!(
            success = summary.success_count,
            failed = summary.failed_count,
            "Dispatch finished"
        );

        summary
    }

    async fn send_one<S>(
        &self,
        recipient: &Recipient,
        template: &MessageTemplate,
        sender: &S,
    ) -> DispatchOutcome
    where
        S: MessageSender + Sync,
    {
        let message = render_message(template, recipient, self.channel, self.from.as_ref());

        let result = match self.config.send_timeout {
            Some(limit) => match timeout(limit, sender.send(&message)).await {
                Ok(result) => result,
                Err(_) => Err(ContractError::SendTimeout {
                    sender: sender.name().to_string(),
                    recipient: recipient.address.clone(),
                    waited_ms: limit.as_millis() as u64,
                }),
            },
            None => sender.send(&message).await,
        };

        let status = match result {
            Ok(()) => DispatchStatus::Success,
            Err(e) => {
                warn!(
                    sender = %sender.name(),
                    recipient = %recipient.address,
                    error = %e,
                    "Send failed"
                );
                DispatchStatus::Failed
            }
        };

        DispatchOutcome {
            recipient: recipient.clone(),
            status,
        }
    }
}

/// One-shot dispatch with explicit batching parameters
///
/// # Errors
/// Only `InvalidBatchSize`; send failures are counted, not raised.
pub async fn dispatch<S>(
    recipients: &[Recipient],
    template: &MessageTemplate,
    sender: &S,
    batch_size: usize,
    inter_batch_delay: Duration,
) -> Result<DispatchSummary, DispatcherError>
where
    S: MessageSender + Sync,
{
    let dispatcher = BatchDispatcher::new(DispatchConfig {
        batch_size,
        inter_batch_delay,
        send_timeout: None,
    })?;
    Ok(dispatcher.dispatch(recipients, template, sender).await)
}
