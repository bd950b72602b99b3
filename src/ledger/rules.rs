//! Protocol parameters for submissions, voting and flagging

use crate::reputation::{DOWNVOTE_PENALTY, REPORT_POINTS, SOLVE_POINTS, UPVOTE_POINTS};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Lowest accepted priority
pub const MIN_PRIORITY: u8 = 1;

/// Highest accepted priority
pub const MAX_PRIORITY: u8 = 5;

/// Minimum seconds between two submissions from the same identity
pub const COOLDOWN_SECS: u64 = 3600;

/// Downvotes required before a report can be auto-flagged
pub const FLAG_MIN_DOWNVOTES: u64 = 5;

/// Auto-flag only when downvotes exceed this multiple of upvotes
pub const FLAG_DOWNVOTE_RATIO: u64 = 2;

/// Point amounts, cooldown and flag thresholds.
///
/// `Default` is the fixed protocol parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRules {
    pub report_points: u64,
    pub upvote_points: u64,
    pub downvote_penalty: u64,
    pub solve_points: u64,
    pub cooldown_secs: u64,
    pub flag_min_downvotes: u64,
    pub flag_downvote_ratio: u64,
}

impl Default for LedgerRules {
    fn default() -> Self {
        Self {
            report_points: REPORT_POINTS,
            upvote_points: UPVOTE_POINTS,
            downvote_penalty: DOWNVOTE_PENALTY,
            solve_points: SOLVE_POINTS,
            cooldown_secs: COOLDOWN_SECS,
            flag_min_downvotes: FLAG_MIN_DOWNVOTES,
            flag_downvote_ratio: FLAG_DOWNVOTE_RATIO,
        }
    }
}

impl LedgerRules {
    pub fn priority_in_range(priority: u8) -> bool {
        (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority)
    }

    pub fn cooldown(&self) -> Duration {
        i64::try_from(self.cooldown_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX)
    }

    /// Whether vote counts cross the auto-flag threshold
    pub fn should_flag(&self, upvotes: u64, downvotes: u64) -> bool {
        downvotes >= self.flag_min_downvotes
            && downvotes > upvotes.saturating_mul(self.flag_downvote_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_range() {
        assert!(!LedgerRules::priority_in_range(0));
        assert!(LedgerRules::priority_in_range(1));
        assert!(LedgerRules::priority_in_range(5));
        assert!(!LedgerRules::priority_in_range(6));
    }

    #[test]
    fn test_flag_threshold() {
        let rules = LedgerRules::default();
        assert!(!rules.should_flag(0, 4));
        assert!(rules.should_flag(0, 5));
        // 5 downvotes but not more than twice the upvotes
        assert!(!rules.should_flag(3, 5));
        assert!(rules.should_flag(3, 7));
        assert!(!rules.should_flag(3, 6));
    }

    #[test]
    fn test_default_cooldown_is_one_hour() {
        assert_eq!(LedgerRules::default().cooldown(), Duration::hours(1));
    }
}
