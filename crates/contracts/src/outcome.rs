//! Dispatch outcomes and the aggregate summary returned to callers

use serde::{Deserialize, Serialize};

use crate::Recipient;

/// Per-recipient result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Success,
    Failed,
}

impl DispatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// Outcome of one send attempt. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub recipient: Recipient,
    pub status: DispatchStatus,
}

/// Aggregate counts of a dispatch
///
/// `success_count + failed_count` equals the number of recipients submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub success_count: u64,
    pub failed_count: u64,
}

/// Caller-facing interpretation of a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchVerdict {
    /// Every recipient succeeded
    Delivered,
    /// At least one success and at least one failure
    PartiallyDelivered,
    /// No recipient succeeded
    Failed,
    /// Nothing was submitted
    Empty,
}

impl DispatchSummary {
    pub fn total(&self) -> u64 {
        self.success_count + self.failed_count
    }

    /// Fold one outcome into the counts
    pub fn record(&mut self, status: DispatchStatus) {
        match status {
            DispatchStatus::Success => self.success_count += 1,
            DispatchStatus::Failed => self.failed_count += 1,
        }
    }

    pub fn merge(&mut self, other: DispatchSummary) {
        self.success_count += other.success_count;
        self.failed_count += other.failed_count;
    }

    pub fn verdict(&self) -> DispatchVerdict {
        match (self.success_count, self.failed_count) {
            (0, 0) => DispatchVerdict::Empty,
            (0, _) => DispatchVerdict::Failed,
            (_, 0) => DispatchVerdict::Delivered,
            _ => DispatchVerdict::PartiallyDelivered,
        }
    }

    /// Success ratio in percent (0 when empty)
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total > 0 {
            self.success_count as f64 / total as f64 * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdicts() {
        let summary = |s, f| DispatchSummary {
            success_count: s,
            failed_count: f,
        };
        assert_eq!(summary(0, 0).verdict(), DispatchVerdict::Empty);
        assert_eq!(summary(0, 3).verdict(), DispatchVerdict::Failed);
        assert_eq!(summary(3, 0).verdict(), DispatchVerdict::Delivered);
        assert_eq!(summary(2, 1).verdict(), DispatchVerdict::PartiallyDelivered);
    }

    #[test]
    fn test_record_and_merge() {
        let mut a = DispatchSummary::default();
        a.record(DispatchStatus::Success);
        a.record(DispatchStatus::Failed);
        a.record(DispatchStatus::Success);

        let mut b = DispatchSummary::default();
        b.record(DispatchStatus::Failed);
        b.merge(a);

        assert_eq!(b.success_count, 2);
        assert_eq!(b.failed_count, 2);
        assert_eq!(b.total(), 4);
        assert!((b.success_rate() - 50.0).abs() < 1e-10);
    }
}
