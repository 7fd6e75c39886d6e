//! DispatchHandle - runs a dispatch on a background task with live progress

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use contracts::{DispatchSummary, MessageSender, MessageTemplate, Recipient};

use crate::dispatcher::{BatchDispatcher, BatchReport};
use crate::error::DispatcherError;

/// Progress snapshot, published after every batch barrier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchProgress {
    pub total: u64,
    pub completed: u64,
    pub success: u64,
    pub failed: u64,
    pub batches_done: usize,
    pub total_batches: usize,
}

impl DispatchProgress {
    pub fn is_finished(&self) -> bool {
        self.completed == self.total
    }

    /// Completion in percent (100 for an empty dispatch)
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }

    fn apply(&mut self, report: &BatchReport) {
        self.completed += report.summary.total();
        self.success += report.summary.success_count;
        self.failed += report.summary.failed_count;
        self.batches_done = report.index + 1;
    }
}

/// Handle to a running dispatch
pub struct DispatchHandle {
    /// Progress updates
    progress_rx: watch::Receiver<DispatchProgress>,
    /// Worker task handle
    worker_handle: JoinHandle<DispatchSummary>,
}

impl DispatchHandle {
    /// Spawn the dispatch as a background task
    pub fn spawn<S>(
        dispatcher: BatchDispatcher,
        recipients: Vec<Recipient>,
        template: MessageTemplate,
        sender: Arc<S>,
    ) -> Self
    where
        S: MessageSender + Sync + 'static,
    {
        Self::spawn_observed(dispatcher, recipients, template, sender, |_| {})
    }

    /// Spawn the dispatch, additionally calling `on_batch` after each barrier
    pub fn spawn_observed<S, F>(
        dispatcher: BatchDispatcher,
        recipients: Vec<Recipient>,
        template: MessageTemplate,
        sender: Arc<S>,
        mut on_batch: F,
    ) -> Self
    where
        S: MessageSender + Sync + 'static,
        F: FnMut(&BatchReport) + Send + 'static,
    {
        let initial = DispatchProgress {
            total: recipients.len() as u64,
            total_batches: dispatcher.batch_count(recipients.len()),
            ..DispatchProgress::default()
        };
        let (progress_tx, progress_rx) = watch::channel(initial);

        let worker_handle = tokio::spawn(async move {
            dispatcher
                .dispatch_observed(&recipients, &template, sender.as_ref(), |report| {
                    progress_tx.send_modify(|progress| progress.apply(report));
                    on_batch(report);
                })
                .await
        });

        Self {
            progress_rx,
            worker_handle,
        }
    }

    /// Latest progress snapshot
    pub fn progress(&self) -> DispatchProgress {
        *self.progress_rx.borrow()
    }

    /// Receiver notified on every batch
    pub fn subscribe(&self) -> watch::Receiver<DispatchProgress> {
        self.progress_rx.clone()
    }

    /// Stop the dispatch; batches already settled stay counted in progress
    pub fn abort(&self) {
        self.worker_handle.abort();
    }

    /// Wait for the dispatch to complete
    #[instrument(name = "dispatch_handle_join", skip(self))]
    pub async fn join(self) -> Result<DispatchSummary, DispatcherError> {
        match self.worker_handle.await {
            Ok(summary) => {
                debug!(
                    success = summary.success_count,
                    failed = summary.failed_count,
                    "Dispatch worker finished"
                );
                Ok(summary)
            }
            Err(e) => {
                error!(error = ?e, "Dispatch worker did not complete");
                Err(DispatcherError::Worker {
                    message: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::DispatchConfig;
    use contracts::{ContractError, ResolvedMessage};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    /// Mock sender failing every other call
    struct AlternatingSender {
        calls: AtomicU64,
    }

    impl MessageSender for AlternatingSender {
        fn name(&self) -> &str {
            "alternating"
        }

        async fn send(&self, message: &ResolvedMessage) -> Result<(), ContractError> {
            let n = self.calls.fetch_add(1, Ordering::Relaxed);
            if n % 2 == 1 {
                return Err(ContractError::send_failed(
                    "alternating",
                    &message.recipient_address,
                    "odd call",
                ));
            }
            Ok(())
        }
    }

    fn recipients(n: usize) -> Vec<Recipient> {
        (0..n)
            .map(|i| Recipient::new(format!("r{i}@example.com"), format!("R{i}")))
            .collect()
    }

    fn dispatcher(delay: Duration) -> BatchDispatcher {
        BatchDispatcher::new(DispatchConfig {
            batch_size: 4,
            inter_batch_delay: delay,
            send_timeout: None,
        })
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_join_returns_summary() {
        let sender = Arc::new(AlternatingSender {
            calls: AtomicU64::new(0),
        });
        let handle = DispatchHandle::spawn(
            dispatcher(Duration::from_millis(100)),
            recipients(10),
            MessageTemplate::new(None, "Hi {name}"),
            Arc::clone(&sender),
        );

        let initial = handle.progress();
        assert_eq!(initial.total, 10);
        assert_eq!(initial.total_batches, 3);

        let summary = handle.join().await.unwrap();
        assert_eq!(summary.total(), 10);
        assert_eq!(summary.success_count, 5);
        assert_eq!(sender.calls.load(Ordering::Relaxed), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_published_per_batch() {
        let sender = Arc::new(AlternatingSender {
            calls: AtomicU64::new(0),
        });
        let handle = DispatchHandle::spawn(
            dispatcher(Duration::from_secs(1)),
            recipients(9),
            MessageTemplate::new(None, "Hi {name}"),
            sender,
        );
        let mut rx = handle.subscribe();

        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let progress = *rx.borrow_and_update();
            seen.push(progress.completed);
            if progress.is_finished() {
                break;
            }
        }

        assert_eq!(seen, vec![4, 8, 9]);
        let summary = handle.join().await.unwrap();
        assert_eq!(summary.total(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_runs_on_worker() {
        let batches = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&batches);
        let handle = DispatchHandle::spawn_observed(
            dispatcher(Duration::ZERO),
            recipients(6),
            MessageTemplate::new(None, "Hi {name}"),
            Arc::new(AlternatingSender {
                calls: AtomicU64::new(0),
            }),
            move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            },
        );

        handle.join().await.unwrap();
        assert_eq!(batches.load(Ordering::Relaxed), 2);
    }

    /// Mock sender that always succeeds, counting calls
    struct CountingSender {
        calls: AtomicU64,
    }

    impl MessageSender for CountingSender {
        fn name(&self) -> &str {
            "counting"
        }

        async fn send(&self, _message: &ResolvedMessage) -> Result<(), ContractError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_keeps_settled_batches_only() {
        let sender = Arc::new(CountingSender {
            calls: AtomicU64::new(0),
        });
        let handle = DispatchHandle::spawn(
            BatchDispatcher::new(DispatchConfig {
                batch_size: 5,
                inter_batch_delay: Duration::from_secs(1),
                send_timeout: None,
            })
            .unwrap(),
            recipients(12),
            MessageTemplate::new(None, "Hi {name}"),
            Arc::clone(&sender),
        );
        let mut rx = handle.subscribe();

        // first barrier passed, worker now pausing before batch 2
        rx.changed().await.unwrap();
        handle.abort();

        let progress = handle.progress();
        assert_eq!(progress.success, 5);
        assert_eq!(progress.failed, 0);
        assert_eq!(progress.completed, 5);
        assert_eq!(progress.batches_done, 1);
        assert_eq!(progress.total_batches, 3);
        assert!(!progress.is_finished());

        let err = handle.join().await.unwrap_err();
        assert!(matches!(err, DispatcherError::Worker { .. }));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sender.calls.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_progress_percent() {
        let progress = DispatchProgress {
            total: 8,
            completed: 2,
            ..DispatchProgress::default()
        };
        assert!((progress.percent() - 25.0).abs() < 1e-10);
        assert!(!progress.is_finished());
        assert!(DispatchProgress::default().is_finished());
    }
}
