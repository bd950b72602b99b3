//! Ledger Service - serialized access to the state machine
//!
//! Writers hold the write guard for the whole operation, so mutations never
//! interleave. Readers share the read guard and always see a fully applied
//! state.

use crate::error::LedgerResult;
use crate::events::EventRecord;
use crate::ledger::{LedgerRules, NewReport, Page, ReportStateMachine, ReportView};
use crate::reputation::UserProfile;
use crate::types::{Identity, Timestamp};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::warn;

/// Cloneable handle to one shared ledger
#[derive(Clone)]
pub struct LedgerService {
    machine: Arc<RwLock<ReportStateMachine>>,
}

impl LedgerService {
    pub fn new(machine: ReportStateMachine) -> Self {
        Self {
            machine: Arc::new(RwLock::new(machine)),
        }
    }

    pub fn with_rules(rules: LedgerRules) -> Self {
        Self::new(ReportStateMachine::with_rules(rules))
    }

    pub async fn submit_report(
        &self,
        report: NewReport,
        reporter: &Identity,
        now: Timestamp,
    ) -> LedgerResult<u64> {
        let mut machine = self.machine.write().await;
        machine
            .submit_report(report, reporter, now)
            .inspect_err(|e| warn!(reporter = %reporter, error = %e, "Submission rejected"))
    }

    pub async fn vote_report(
        &self,
        report_id: u64,
        voter: &Identity,
        is_upvote: bool,
        now: Timestamp,
    ) -> LedgerResult<()> {
        let mut machine = self.machine.write().await;
        machine
            .vote_report(report_id, voter, is_upvote, now)
            .inspect_err(|e| warn!(report_id, voter = %voter, error = %e, "Vote rejected"))
    }

    pub async fn mark_report_solved(&self, report_id: u64, caller: &Identity) -> LedgerResult<()> {
        let mut machine = self.machine.write().await;
        machine
            .mark_report_solved(report_id, caller)
            .inspect_err(|e| warn!(report_id, caller = %caller, error = %e, "Solve rejected"))
    }

    pub async fn mark_report_flagged(&self, report_id: u64, caller: &Identity) -> LedgerResult<()> {
        let mut machine = self.machine.write().await;
        machine
            .mark_report_flagged(report_id, caller)
            .inspect_err(|e| warn!(report_id, caller = %caller, error = %e, "Flag rejected"))
    }

    pub async fn get_report(&self, report_id: u64) -> LedgerResult<ReportView> {
        self.machine.read().await.queries().get_report(report_id)
    }

    pub async fn get_user_profile(&self, identity: &Identity) -> UserProfile {
        self.machine.read().await.queries().get_user_profile(identity)
    }

    pub async fn has_voted(&self, report_id: u64, identity: &Identity) -> bool {
        self.machine.read().await.queries().has_voted(report_id, identity)
    }

    pub async fn get_all_reports(&self, offset: u64, limit: u64) -> LedgerResult<Page> {
        self.machine.read().await.queries().get_all_reports(offset, limit)
    }

    pub async fn get_user_reports(
        &self,
        identity: &Identity,
        offset: u64,
        limit: u64,
    ) -> LedgerResult<Page> {
        self.machine
            .read()
            .await
            .queries()
            .get_user_reports(identity, offset, limit)
    }

    /// Live notifications published after this call
    pub async fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.machine.read().await.events().subscribe()
    }

    /// Most recent notifications from history, oldest first
    pub async fn recent_events(&self, limit: usize) -> Vec<EventRecord> {
        self.machine.read().await.events().recent(limit)
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new(ReportStateMachine::default())
    }
}
