//! Aggregate counts over every stored submission.

use serde::Serialize;

/// Per-status counts as read from the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Every stored submission.
    pub total: u64,
    /// Submissions awaiting review.
    pub pending: u64,
    /// Approved submissions.
    pub approved: u64,
    /// Rejected submissions.
    pub rejected: u64,
    /// Submissions being worked on.
    pub processing: u64,
}

/// Counts plus approval and rejection rates.
///
/// Rates are percentages of `total`, rounded half-up to two decimals, and
/// are `0.0` when nothing is stored.
///
/// # Examples
/// ```
/// use form_intake::domain::{StatusCounts, SubmissionStats};
///
/// let stats = SubmissionStats::from(StatusCounts {
///     total: 3,
///     pending: 1,
///     approved: 1,
///     rejected: 1,
///     processing: 0,
/// });
/// assert_eq!(stats.approval_rate, 33.33);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStats {
    /// Every stored submission.
    pub total: u64,
    /// Submissions awaiting review.
    pub pending: u64,
    /// Approved submissions.
    pub approved: u64,
    /// Rejected submissions.
    pub rejected: u64,
    /// Submissions being worked on.
    pub processing: u64,
    /// `approved / total` as a percentage.
    pub approval_rate: f64,
    /// `rejected / total` as a percentage.
    pub rejection_rate: f64,
}

impl From<StatusCounts> for SubmissionStats {
    fn from(counts: StatusCounts) -> Self {
        Self {
            total: counts.total,
            pending: counts.pending,
            approved: counts.approved,
            rejected: counts.rejected,
            processing: counts.processing,
            approval_rate: percentage(counts.approved, counts.total),
            rejection_rate: percentage(counts.rejected, counts.total),
        }
    }
}

/// `part / total * 100`, rounded half-up to two decimals.
///
/// Works in integer hundredths of a percent so `x.xx5` boundaries round the
/// same way on every platform.
fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let part = u128::from(part.min(total));
    let total = u128::from(total);
    let hundredths = (part * 20_000 + total) / (total * 2);
    u32::try_from(hundredths).map_or(100.0, |h| f64::from(h) / 100.0)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(5, 0, 0.0)]
    #[case(1, 3, 33.33)]
    #[case(2, 3, 66.67)]
    #[case(1, 8, 12.5)]
    #[case(1, 6, 16.67)]
    #[case(1, 1, 100.0)]
    #[case(1, 200_000, 0.0)]
    #[case(1, 40_000, 0.0)]
    #[case(1, 20_000, 0.01)]
    fn percentage_rounds_half_up(#[case] part: u64, #[case] total: u64, #[case] expected: f64) {
        assert!((percentage(part, total) - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    fn empty_counts_yield_zero_rates() {
        let stats = SubmissionStats::from(StatusCounts::default());
        assert_eq!(stats, SubmissionStats::default());
    }

    #[rstest]
    fn serialises_with_camel_case_rates() {
        let stats = SubmissionStats::from(StatusCounts {
            total: 4,
            pending: 1,
            approved: 2,
            rejected: 1,
            processing: 0,
        });
        let json = serde_json::to_value(stats).expect("serialise");
        assert_eq!(json["approvalRate"], 50.0);
        assert_eq!(json["rejectionRate"], 25.0);
        assert_eq!(json["processing"], 0);
    }
}
