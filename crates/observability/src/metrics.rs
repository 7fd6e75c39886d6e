//! Dispatch 指标收集模块
//!
//! 基于每个批次的 DispatchOutcome 收集和统计发送运行指标。

use std::collections::HashMap;
use std::time::Duration;

use contracts::{Channel, DispatchOutcome, DispatchStatus, DispatchSummary};
use metrics::{counter, gauge, histogram};

/// 记录单条消息的发送结果
pub fn record_send_outcome(sender: &str, channel: Channel, status: DispatchStatus) {
    counter!(
        "outreach_messages_total",
        "sender" => sender.to_string(),
        "channel" => channel.as_str(),
        "status" => status.as_str()
    )
    .increment(1);
}

/// 记录一个批次完成
///
/// 每次批次屏障结束后调用。
///
/// # Example
///
/// ```ignore
/// dispatcher.dispatch_observed(&recipients, &template, &sender, |report| {
///     record_batch_completed(report.outcomes.len(), report.elapsed);
/// }).await;
/// ```
pub fn record_batch_completed(batch_size: usize, elapsed: Duration) {
    counter!("outreach_batches_total").increment(1);
    histogram!("outreach_batch_size").record(batch_size as f64);
    histogram!("outreach_batch_duration_ms").record(elapsed.as_secs_f64() * 1000.0);
}

/// 记录整次发送的汇总
pub fn record_dispatch_summary(campaign: &str, summary: &DispatchSummary) {
    counter!("outreach_dispatches_total", "campaign" => campaign.to_string()).increment(1);
    gauge!("outreach_last_dispatch_success", "campaign" => campaign.to_string())
        .set(summary.success_count as f64);
    gauge!("outreach_last_dispatch_failed", "campaign" => campaign.to_string())
        .set(summary.failed_count as f64);
    gauge!("outreach_last_dispatch_success_rate", "campaign" => campaign.to_string())
        .set(summary.success_rate());
}

/// 发送指标聚合器
///
/// 在内存中聚合指标，便于运行结束后输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// 已完成批次数
    pub total_batches: u64,

    /// 成功/失败计数
    pub totals: DispatchSummary,

    /// 批次耗时统计 (毫秒)
    pub batch_duration_stats: RunningStats,

    /// 批次大小统计
    pub batch_size_stats: RunningStats,

    /// 失败的收件地址
    pub failed_recipients: Vec<String>,

    /// 各域名失败次数
    pub failures_by_domain: HashMap<String, u64>,
}

impl DispatchStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, outcomes: &[DispatchOutcome], elapsed: Duration) {
        self.total_batches += 1;
        self.batch_size_stats.push(outcomes.len() as f64);
        self.batch_duration_stats
            .push(elapsed.as_secs_f64() * 1000.0);

        for outcome in outcomes {
            self.totals.record(outcome.status);
            if outcome.status == DispatchStatus::Failed {
                let address = &outcome.recipient.address;
                self.failed_recipients.push(address.clone());
                *self
                    .failures_by_domain
                    .entry(domain_of(address).to_string())
                    .or_insert(0) += 1;
            }
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_batches: self.total_batches,
            success_count: self.totals.success_count,
            failed_count: self.totals.failed_count,
            success_rate: self.totals.success_rate(),
            batch_duration_ms: StatsSummary::from(&self.batch_duration_stats),
            batch_size: StatsSummary::from(&self.batch_size_stats),
            failures_by_domain: self.failures_by_domain.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Domain part of an email address, or the whole address for phone numbers
fn domain_of(address: &str) -> &str {
    address
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .unwrap_or(address)
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_batches: u64,
    pub success_count: u64,
    pub failed_count: u64,
    pub success_rate: f64,
    pub batch_duration_ms: StatsSummary,
    pub batch_size: StatsSummary,
    pub failures_by_domain: HashMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Metrics Summary ===")?;
        writeln!(f, "Batches: {}", self.total_batches)?;
        writeln!(
            f,
            "Sent: {} ok / {} failed ({:.2}% success)",
            self.success_count, self.failed_count, self.success_rate
        )?;
        writeln!(f, "Batch size: {}", self.batch_size)?;
        writeln!(f, "Batch duration (ms): {}", self.batch_duration_ms)?;

        if !self.failures_by_domain.is_empty() {
            writeln!(f, "Failures by domain:")?;
            let mut domains: Vec<_> = self.failures_by_domain.iter().collect();
            domains.sort();
            for (domain, count) in domains {
                writeln!(f, "  {}: {}", domain, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.1}, std={:.1} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Recipient;

    fn outcome(address: &str, status: DispatchStatus) -> DispatchOutcome {
        DispatchOutcome {
            recipient: Recipient::new(address, "Someone"),
            status,
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1000.0, 1200.0, 800.0, 1000.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 4);
        assert!((stats.mean() - 1000.0).abs() < 1e-10);
        assert!((stats.min() - 800.0).abs() < 1e-10);
        assert!((stats.max() - 1200.0).abs() < 1e-10);
        // sum of squared deviations = 80000, n-1 = 3
        assert!((stats.variance() - 80000.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_stats_display() {
        let summary = StatsSummary::from(&RunningStats::default());
        assert_eq!(summary.to_string(), "N/A");
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = DispatchStatsAggregator::new();

        aggregator.update(
            &[
                outcome("a@example.com", DispatchStatus::Success),
                outcome("b@bounce.test", DispatchStatus::Failed),
            ],
            Duration::from_millis(40),
        );
        aggregator.update(
            &[outcome("c@bounce.test", DispatchStatus::Failed)],
            Duration::from_millis(60),
        );

        assert_eq!(aggregator.total_batches, 2);
        assert_eq!(aggregator.totals.success_count, 1);
        assert_eq!(aggregator.totals.failed_count, 2);
        assert_eq!(
            aggregator.failed_recipients,
            vec!["b@bounce.test", "c@bounce.test"]
        );
        assert_eq!(aggregator.failures_by_domain.get("bounce.test"), Some(&2));
        assert!((aggregator.batch_duration_stats.mean() - 50.0).abs() < 1e-9);

        aggregator.reset();
        assert_eq!(aggregator.total_batches, 0);
        assert!(aggregator.failed_recipients.is_empty());
    }

    #[test]
    fn test_phone_number_domain() {
        assert_eq!(domain_of("+15550100"), "+15550100");
        assert_eq!(domain_of("ops@corp.example"), "corp.example");
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = DispatchStatsAggregator::new();
        aggregator.update(
            &[
                outcome("a@example.com", DispatchStatus::Success),
                outcome("b@example.com", DispatchStatus::Success),
                outcome("c@example.com", DispatchStatus::Success),
                outcome("d@bounce.test", DispatchStatus::Failed),
            ],
            Duration::from_millis(120),
        );

        let output = aggregator.summary().to_string();
        assert!(output.contains("Batches: 1"));
        assert!(output.contains("3 ok / 1 failed (75.00% success)"));
        assert!(output.contains("bounce.test: 1"));
    }
}
