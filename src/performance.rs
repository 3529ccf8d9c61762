//! Win-rate feedback for a player's season.

use serde::Serialize;
use std::fmt;

/// Feedback tiers, ordered from worst to best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FeedbackCategory {
    NoData,
    NeedsImprovement,
    Fair,
    Good,
    Excellent,
}

impl FeedbackCategory {
    pub fn label(&self) -> &'static str {
        match self {
            FeedbackCategory::NoData => "no data",
            FeedbackCategory::NeedsImprovement => "needs improvement",
            FeedbackCategory::Fair => "fair",
            FeedbackCategory::Good => "good",
            FeedbackCategory::Excellent => "excellent",
        }
    }

    /// Longer feedback sentence shown next to the evaluator inputs.
    pub fn message(&self) -> &'static str {
        match self {
            FeedbackCategory::NoData => "No matches played yet. Performance cannot be evaluated.",
            FeedbackCategory::NeedsImprovement => {
                "Needs improvement. Identify areas of weakness and work on them."
            }
            FeedbackCategory::Fair => "Fair performance. Keep practicing to improve.",
            FeedbackCategory::Good => "Good performance! There's always room for improvement.",
            FeedbackCategory::Excellent => "Excellent performance! Keep up the good work!",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Percentage of matches won, or `None` when nothing was played.
pub fn win_percentage(played: f64, won: f64) -> Option<f64> {
    if played == 0.0 {
        return None;
    }
    Some(won / played * 100.0)
}

/// Buckets a win rate into a feedback tier.
///
/// Inputs are taken as given: `won > played` or negative counts are not
/// rejected here.
pub fn evaluate(played: f64, won: f64) -> FeedbackCategory {
    let Some(pct) = win_percentage(played, won) else {
        return FeedbackCategory::NoData;
    };

    if pct >= 80.0 {
        FeedbackCategory::Excellent
    } else if pct >= 60.0 {
        FeedbackCategory::Good
    } else if pct >= 40.0 {
        FeedbackCategory::Fair
    } else {
        FeedbackCategory::NeedsImprovement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(evaluate(5.0, 4.0), FeedbackCategory::Excellent);
        assert_eq!(evaluate(5.0, 3.0), FeedbackCategory::Good);
        assert_eq!(evaluate(5.0, 2.0), FeedbackCategory::Fair);
        assert_eq!(evaluate(100.0, 39.0), FeedbackCategory::NeedsImprovement);
    }

    #[test]
    fn test_win_percentage() {
        assert_eq!(win_percentage(0.0, 3.0), None);
        assert_eq!(win_percentage(4.0, 1.0), Some(25.0));
    }

    #[test]
    fn test_labels() {
        assert_eq!(FeedbackCategory::NoData.to_string(), "no data");
        assert_eq!(FeedbackCategory::NeedsImprovement.label(), "needs improvement");
        assert!(FeedbackCategory::Excellent > FeedbackCategory::Good);
        assert!(FeedbackCategory::NeedsImprovement > FeedbackCategory::NoData);
    }
}
