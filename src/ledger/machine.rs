//! Report State Machine
//!
//! Every mutating operation runs in two phases: all preconditions are
//! checked against the stores first, then the mutations are applied and the
//! resulting notifications are published. A failed precondition therefore
//! leaves every store and the event stream untouched.
//!
//! ```text
//!            vote (downvote threshold)
//!          ┌──────────────────────────► Flagged
//!  Active ─┤  mark_report_flagged  ───►
//!          └─ mark_report_solved ─────► Solved
//! ```

use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventLog, LedgerEvent};
use crate::ledger::{
    LedgerRules, NewReport, QueryService, ReportStatus, ReportStore, VoteLedger,
};
use crate::reputation::{PointsDelta, PointsReason, ReputationLedger};
use crate::types::{Identity, Timestamp};
use tracing::{debug, info};

/// Orchestrates submissions, votes and status transitions
pub struct ReportStateMachine {
    reports: ReportStore,
    votes: VoteLedger,
    reputation: ReputationLedger,
    rules: LedgerRules,
    events: EventLog,
}

impl ReportStateMachine {
    pub fn new(
        reports: ReportStore,
        votes: VoteLedger,
        reputation: ReputationLedger,
        rules: LedgerRules,
        events: EventLog,
    ) -> Self {
        Self {
            reports,
            votes,
            reputation,
            rules,
            events,
        }
    }

    /// Empty stores with the given rules
    pub fn with_rules(rules: LedgerRules) -> Self {
        Self::new(
            ReportStore::new(),
            VoteLedger::new(),
            ReputationLedger::new(),
            rules,
            EventLog::default(),
        )
    }

    /// Submit a new report and credit the reporter
    pub fn submit_report(
        &mut self,
        report: NewReport,
        reporter: &Identity,
        now: Timestamp,
    ) -> LedgerResult<u64> {
        if !LedgerRules::priority_in_range(report.priority) {
            return Err(LedgerError::InvalidPriority(report.priority));
        }

        let profile = self.reputation.get_profile(reporter);
        if let Some(next_allowed) = profile.next_submission_at(self.rules.cooldown()) {
            if now < next_allowed {
                return Err(LedgerError::CooldownActive {
                    remaining_secs: (next_allowed - now).num_seconds(),
                });
            }
        }

        let report_id = self.reports.create(report, reporter, now);
        self.reputation.touch_submission(reporter, now);
        let points = self.reputation.update_points(
            reporter,
            PointsDelta::Credit(self.rules.report_points),
            PointsReason::ReportSubmission,
        );

        info!(report_id, reporter = %reporter, "Report submitted");

        self.events.publish(vec![
            points,
            LedgerEvent::ReportSubmitted {
                report_id,
                reporter: reporter.clone(),
            },
        ]);

        Ok(report_id)
    }

    /// Cast a single vote on someone else's active report
    pub fn vote_report(
        &mut self,
        report_id: u64,
        voter: &Identity,
        is_upvote: bool,
        now: Timestamp,
    ) -> LedgerResult<()> {
        let report = self.reports.get(report_id)?;
        if self.votes.has_voted(report_id, voter) {
            return Err(LedgerError::AlreadyVoted(report_id));
        }
        if &report.reporter == voter {
            return Err(LedgerError::SelfVoteForbidden(report_id));
        }
        if !report.is_active() {
            return Err(LedgerError::ReportTerminal(report_id));
        }

        let mut events = Vec::with_capacity(3);
        let report = self.reports.get_mut(report_id)?;
        let reporter = report.reporter.clone();

        if is_upvote {
            report.upvotes += 1;
            events.push(self.reputation.update_points(
                &reporter,
                PointsDelta::Credit(self.rules.upvote_points),
                PointsReason::ReceivedUpvote,
            ));
        } else {
            report.downvotes += 1;
            events.push(self.reputation.update_points(
                &reporter,
                PointsDelta::Debit(self.rules.downvote_penalty),
                PointsReason::ReceivedDownvote,
            ));

            if self.rules.should_flag(report.upvotes, report.downvotes) {
                report.status = ReportStatus::Flagged;
                events.push(LedgerEvent::ReportStatusUpdated {
                    report_id,
                    new_status: ReportStatus::Flagged,
                });
            }
        }

        debug!(
            report_id,
            voter = %voter,
            is_upvote,
            upvotes = report.upvotes,
            downvotes = report.downvotes,
            "Vote cast"
        );

        self.votes.record_vote(report_id, voter, is_upvote, now);
        events.push(LedgerEvent::ReportVoted {
            report_id,
            voter: voter.clone(),
            is_upvote,
        });

        self.events.publish(events);
        Ok(())
    }

    /// Reporter marks their own active report solved
    pub fn mark_report_solved(&mut self, report_id: u64, caller: &Identity) -> LedgerResult<()> {
        let report = self.reports.get(report_id)?;
        if &report.reporter != caller {
            return Err(LedgerError::NotReporter(report_id));
        }
        match report.status {
            ReportStatus::Active => {}
            ReportStatus::Solved => return Err(LedgerError::AlreadySolved(report_id)),
            ReportStatus::Flagged => return Err(LedgerError::NotActive(report_id)),
        }

        self.reports.get_mut(report_id)?.status = ReportStatus::Solved;
        self.reputation.touch_success(caller);
        let points = self.reputation.update_points(
            caller,
            PointsDelta::Credit(self.rules.solve_points),
            PointsReason::ReportSolved,
        );

        self.events.publish(vec![
            points,
            LedgerEvent::ReportStatusUpdated {
                report_id,
                new_status: ReportStatus::Solved,
            },
        ]);

        Ok(())
    }

    /// Reporter flags their own active report, paying the downvote penalty
    pub fn mark_report_flagged(&mut self, report_id: u64, caller: &Identity) -> LedgerResult<()> {
        let report = self.reports.get(report_id)?;
        if &report.reporter != caller {
            return Err(LedgerError::NotReporter(report_id));
        }
        if !report.is_active() {
            return Err(LedgerError::NotActive(report_id));
        }

        self.reports.get_mut(report_id)?.status = ReportStatus::Flagged;
        let points = self.reputation.update_points(
            caller,
            PointsDelta::Debit(self.rules.downvote_penalty),
            PointsReason::ReportFlagged,
        );

        self.events.publish(vec![
            points,
            LedgerEvent::ReportStatusUpdated {
                report_id,
                new_status: ReportStatus::Flagged,
            },
        ]);

        Ok(())
    }

    /// Read-only view over the current state
    pub fn queries(&self) -> QueryService<'_> {
        QueryService::new(&self.reports, &self.votes, &self.reputation)
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn rules(&self) -> &LedgerRules {
        &self.rules
    }
}

impl Default for ReportStateMachine {
    fn default() -> Self {
        Self::with_rules(LedgerRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reputation::UserProfile;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn report(priority: u8) -> NewReport {
        NewReport {
            details: "Flooded underpass".to_string(),
            location: "5th & Pine".to_string(),
            media_ref: "ipfs://clip".to_string(),
            category: "hazard".to_string(),
            priority,
        }
    }

    fn id(name: &str) -> Identity {
        Identity::from(name)
    }

    #[test]
    fn test_submit_credits_reporter() {
        let mut machine = ReportStateMachine::default();
        let report_id = machine.submit_report(report(3), &id("alice"), at(0)).unwrap();

        assert_eq!(report_id, 1);
        let profile = machine.queries().get_user_profile(&id("alice"));
        assert_eq!(profile.points, 100);
        assert_eq!(profile.reports_submitted, 1);
        assert_eq!(profile.last_report_time, Some(at(0)));
    }

    #[test]
    fn test_invalid_priority_has_no_effect() {
        let mut machine = ReportStateMachine::default();

        assert_eq!(
            machine.submit_report(report(0), &id("alice"), at(0)),
            Err(LedgerError::InvalidPriority(0))
        );
        assert_eq!(
            machine.submit_report(report(6), &id("alice"), at(0)),
            Err(LedgerError::InvalidPriority(6))
        );
        assert_eq!(machine.queries().get_user_profile(&id("alice")), UserProfile::default());
        assert_eq!(machine.events().last_sequence(), 0);
    }

    #[test]
    fn test_cooldown_boundary() {
        let mut machine = ReportStateMachine::default();
        machine.submit_report(report(3), &id("alice"), at(1_000)).unwrap();

        assert_eq!(
            machine.submit_report(report(3), &id("alice"), at(4_599)),
            Err(LedgerError::CooldownActive { remaining_secs: 1 })
        );
        assert_eq!(machine.submit_report(report(3), &id("alice"), at(4_600)), Ok(2));

        // Other identities are unaffected
        assert_eq!(machine.submit_report(report(3), &id("bob"), at(4_601)), Ok(3));
    }

    #[test]
    fn test_upvote_credits_reporter() {
        let mut machine = ReportStateMachine::default();
        let rid = machine.submit_report(report(2), &id("alice"), at(0)).unwrap();

        machine.vote_report(rid, &id("bob"), true, at(10)).unwrap();

        let view = machine.queries().get_report(rid).unwrap();
        assert_eq!(view.upvotes, 1);
        assert_eq!(view.status, ReportStatus::Active);
        assert_eq!(machine.queries().get_user_profile(&id("alice")).points, 102);
        assert!(machine.queries().has_voted(rid, &id("bob")));
    }

    #[test]
    fn test_upvotes_never_change_status() {
        let mut machine = ReportStateMachine::default();
        let rid = machine.submit_report(report(2), &id("alice"), at(0)).unwrap();

        for voter in ["b", "c", "d", "e"] {
            machine.vote_report(rid, &id(voter), true, at(10)).unwrap();
        }

        let view = machine.queries().get_report(rid).unwrap();
        assert_eq!(view.upvotes, 4);
        assert_eq!(view.status, ReportStatus::Active);
    }

    #[test]
    fn test_vote_precondition_order() {
        let mut machine = ReportStateMachine::default();
        assert_eq!(
            machine.vote_report(9, &id("bob"), true, at(0)),
            Err(LedgerError::NotFound(9))
        );

        let rid = machine.submit_report(report(2), &id("alice"), at(0)).unwrap();
        assert_eq!(
            machine.vote_report(rid, &id("alice"), true, at(0)),
            Err(LedgerError::SelfVoteForbidden(rid))
        );

        machine.vote_report(rid, &id("bob"), false, at(0)).unwrap();
        assert_eq!(
            machine.vote_report(rid, &id("bob"), true, at(0)),
            Err(LedgerError::AlreadyVoted(rid))
        );
    }

    #[test]
    fn test_downvote_threshold_flags_report() {
        let mut machine = ReportStateMachine::default();
        let rid = machine.submit_report(report(3), &id("alice"), at(0)).unwrap();

        for (i, voter) in ["v1", "v2", "v3", "v4"].iter().enumerate() {
            machine.vote_report(rid, &id(voter), false, at(i as i64)).unwrap();
            assert_eq!(machine.queries().get_report(rid).unwrap().status, ReportStatus::Active);
        }
        machine.vote_report(rid, &id("v5"), false, at(5)).unwrap();

        let view = machine.queries().get_report(rid).unwrap();
        assert_eq!(view.status, ReportStatus::Flagged);
        assert_eq!(view.downvotes, 5);
        assert_eq!(machine.queries().get_user_profile(&id("alice")).points, 0);

        assert_eq!(
            machine.vote_report(rid, &id("v6"), true, at(6)),
            Err(LedgerError::ReportTerminal(rid))
        );
    }

    #[test]
    fn test_upvotes_delay_flagging() {
        let mut machine = ReportStateMachine::default();
        let rid = machine.submit_report(report(3), &id("alice"), at(0)).unwrap();

        for voter in ["u1", "u2", "u3"] {
            machine.vote_report(rid, &id(voter), true, at(1)).unwrap();
        }
        for i in 0..6 {
            machine.vote_report(rid, &id(&format!("d{i}")), false, at(2)).unwrap();
        }
        assert_eq!(machine.queries().get_report(rid).unwrap().status, ReportStatus::Active);

        machine.vote_report(rid, &id("d6"), false, at(3)).unwrap();
        assert_eq!(machine.queries().get_report(rid).unwrap().status, ReportStatus::Flagged);
    }

    #[test]
    fn test_mark_solved() {
        let mut machine = ReportStateMachine::default();
        let rid = machine.submit_report(report(3), &id("alice"), at(0)).unwrap();

        assert_eq!(
            machine.mark_report_solved(rid, &id("bob")),
            Err(LedgerError::NotReporter(rid))
        );
        machine.mark_report_solved(rid, &id("alice")).unwrap();

        let view = machine.queries().get_report(rid).unwrap();
        assert_eq!(view.status, ReportStatus::Solved);
        assert!(view.is_solved);

        let profile = machine.queries().get_user_profile(&id("alice"));
        assert_eq!(profile.successful_reports, 1);
        assert_eq!(profile.points, 120);

        assert_eq!(
            machine.mark_report_solved(rid, &id("alice")),
            Err(LedgerError::AlreadySolved(rid))
        );
        assert_eq!(
            machine.mark_report_flagged(rid, &id("alice")),
            Err(LedgerError::NotActive(rid))
        );
    }

    #[test]
    fn test_mark_flagged_penalizes_reporter_and_notifies() {
        let mut machine = ReportStateMachine::default();
        let rid = machine.submit_report(report(3), &id("alice"), at(0)).unwrap();

        assert_eq!(
            machine.mark_report_flagged(rid, &id("bob")),
            Err(LedgerError::NotReporter(rid))
        );
        machine.mark_report_flagged(rid, &id("alice")).unwrap();

        assert_eq!(machine.queries().get_report(rid).unwrap().status, ReportStatus::Flagged);
        assert_eq!(machine.queries().get_user_profile(&id("alice")).points, 0);
        assert_eq!(
            machine.mark_report_solved(rid, &id("alice")),
            Err(LedgerError::NotActive(rid))
        );

        let last = machine.events().recent(1).pop().unwrap();
        assert_eq!(
            last.event,
            LedgerEvent::ReportStatusUpdated {
                report_id: rid,
                new_status: ReportStatus::Flagged,
            }
        );
    }

    #[test]
    fn test_vote_notifications_in_effect_order() {
        let mut machine = ReportStateMachine::default();
        let rid = machine.submit_report(report(3), &id("alice"), at(0)).unwrap();
        let before = machine.events().last_sequence();

        machine.vote_report(rid, &id("bob"), true, at(1)).unwrap();

        let events: Vec<LedgerEvent> = machine
            .events()
            .recent(10)
            .into_iter()
            .filter(|r| r.sequence > before)
            .map(|r| r.event)
            .collect();
        assert_eq!(
            events,
            vec![
                LedgerEvent::PointsUpdated {
                    identity: id("alice"),
                    new_total: 102,
                    reason: PointsReason::ReceivedUpvote,
                },
                LedgerEvent::ReportVoted {
                    report_id: rid,
                    voter: id("bob"),
                    is_upvote: true,
                },
            ]
        );
    }

    #[test]
    fn test_custom_rules() {
        let rules = LedgerRules {
            cooldown_secs: 0,
            flag_min_downvotes: 1,
            ..LedgerRules::default()
        };
        let mut machine = ReportStateMachine::with_rules(rules);
        machine.submit_report(report(1), &id("alice"), at(0)).unwrap();
        machine.submit_report(report(1), &id("alice"), at(0)).unwrap();

        machine.vote_report(2, &id("bob"), false, at(0)).unwrap();
        assert_eq!(machine.queries().get_report(2).unwrap().status, ReportStatus::Flagged);
    }
}
