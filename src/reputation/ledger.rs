//! Reputation Ledger - point balances and counters per identity

use crate::events::LedgerEvent;
use crate::reputation::{PointsDelta, PointsReason, UserProfile};
use crate::types::{Identity, Timestamp};
use std::collections::HashMap;
use tracing::debug;

/// Owns every identity's `UserProfile`
#[derive(Debug, Default)]
pub struct ReputationLedger {
    profiles: HashMap<Identity, UserProfile>,
}

impl ReputationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profile for an identity; zero-valued if it was never touched
    pub fn get_profile(&self, identity: &Identity) -> UserProfile {
        self.profiles.get(identity).cloned().unwrap_or_default()
    }

    /// Apply a balance change and return the notification describing it.
    ///
    /// The notification carries the resulting total, not the delta.
    pub fn update_points(
        &mut self,
        identity: &Identity,
        delta: PointsDelta,
        reason: PointsReason,
    ) -> LedgerEvent {
        let profile = self.profile_mut(identity);
        profile.points = delta.apply(profile.points);
        let new_total = profile.points;

        debug!(
            identity = %identity,
            delta = ?delta,
            new_total,
            reason = reason.label(),
            "Updated points"
        );

        LedgerEvent::PointsUpdated {
            identity: identity.clone(),
            new_total,
            reason,
        }
    }

    /// Record an accepted submission
    pub fn touch_submission(&mut self, identity: &Identity, now: Timestamp) {
        let profile = self.profile_mut(identity);
        profile.reports_submitted += 1;
        profile.last_report_time = Some(now);
    }

    /// Record a report of this identity being solved
    pub fn touch_success(&mut self, identity: &Identity) {
        self.profile_mut(identity).successful_reports += 1;
    }

    /// Number of identities with a materialized profile
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    fn profile_mut(&mut self, identity: &Identity) -> &mut UserProfile {
        self.profiles.entry(identity.clone()).or_default()
    }
}
