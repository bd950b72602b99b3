//! Per-identity reputation profile

use crate::types::Timestamp;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Reputation profile for one identity
///
/// `Default` is the zero-valued profile returned for identities that were
/// never touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Current balance, never negative
    pub points: u64,

    /// Accepted submissions
    pub reports_submitted: u64,

    /// Own reports marked solved
    pub successful_reports: u64,

    /// Time of the most recent submission (`None` until the first one)
    pub last_report_time: Option<Timestamp>,
}

impl UserProfile {
    /// Earliest time the next submission is accepted, or `None` if there is
    /// no cooldown pending. Saturates at the maximum representable time.
    pub fn next_submission_at(&self, cooldown: Duration) -> Option<Timestamp> {
        self.last_report_time.map(|last| {
            last.checked_add_signed(cooldown)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_zero_profile() {
        let profile = UserProfile::default();
        assert_eq!(profile.points, 0);
        assert_eq!(profile.reports_submitted, 0);
        assert_eq!(profile.successful_reports, 0);
        assert!(profile.last_report_time.is_none());
        assert!(profile.next_submission_at(Duration::seconds(3600)).is_none());
    }

    #[test]
    fn test_next_submission_after_cooldown() {
        let last = Utc.timestamp_opt(1_000, 0).unwrap();
        let profile = UserProfile {
            last_report_time: Some(last),
            ..Default::default()
        };
        assert_eq!(
            profile.next_submission_at(Duration::seconds(3600)),
            Some(Utc.timestamp_opt(4_600, 0).unwrap())
        );
    }
}
