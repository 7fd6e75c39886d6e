//! Run report printed after a send.

use std::time::Duration;

use contracts::{DispatchSummary, DispatchVerdict};
use observability::MetricsSummary;

/// Statistics from one `send` run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub campaign: String,
    pub sender: String,
    /// Recipients submitted
    pub total: u64,
    /// Counts as returned by the dispatcher (partial when interrupted)
    pub summary: DispatchSummary,
    /// Wall time of the run
    pub duration: Duration,
    pub interrupted: bool,
    /// Per-batch aggregates
    pub metrics: MetricsSummary,
}

impl RunReport {
    /// Messages per second
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.summary.total() as f64 / secs
        } else {
            0.0
        }
    }

    /// One-line outcome shown to the operator
    pub fn headline(&self) -> String {
        if self.interrupted {
            return format!(
                "Interrupted: {} of {} recipients processed",
                self.summary.total(),
                self.total
            );
        }

        match self.summary.verdict() {
            DispatchVerdict::Delivered => {
                format!("All {} messages sent", self.summary.success_count)
            }
            DispatchVerdict::PartiallyDelivered => format!(
                "{} sent, {} failed",
                self.summary.success_count, self.summary.failed_count
            ),
            DispatchVerdict::Failed => {
                format!("All {} sends failed", self.summary.failed_count)
            }
            DispatchVerdict::Empty => "No recipients, nothing sent".to_string(),
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Dispatch Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📨 {}", self.headline());
        println!("   ├─ Campaign: {}", self.campaign);
        println!("   ├─ Sender: {}", self.sender);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Sent: {}", self.summary.success_count);
        println!("   ├─ Failed: {}", self.summary.failed_count);
        println!("   ├─ Success rate: {:.2}%", self.summary.success_rate());
        println!("   └─ Throughput: {:.2} msg/s", self.throughput());

        println!("\n📦 Batches");
        println!("   ├─ Completed: {}", self.metrics.total_batches);
        println!("   ├─ Size: {}", self.metrics.batch_size);
        println!("   └─ Duration (ms): {}", self.metrics.batch_duration_ms);

        if !self.metrics.failures_by_domain.is_empty() {
            println!("\n⚠️  Failures by domain");
            let mut domains: Vec<_> = self.metrics.failures_by_domain.iter().collect();
            domains.sort();
            for (domain, count) in domains {
                println!("   ├─ {}: {}", domain, count);
            }
        }

        println!();
    }
}
