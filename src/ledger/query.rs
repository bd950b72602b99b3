//! Read-only queries over the ledger stores
//!
//! Offsets are 0-based positions in the (possibly filtered) identifier-ordered
//! sequence; `offset == total` is valid and yields an empty page.

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{Report, ReportStore, ReportView, VoteLedger};
use crate::reputation::{ReputationLedger, UserProfile};
use crate::types::Identity;
use serde::{Deserialize, Serialize};

/// One page of reports plus the size of the full result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<ReportView>,
    pub total: u64,
}

/// Borrowed view over the three stores
pub struct QueryService<'a> {
    reports: &'a ReportStore,
    votes: &'a VoteLedger,
    reputation: &'a ReputationLedger,
}

impl<'a> QueryService<'a> {
    pub fn new(
        reports: &'a ReportStore,
        votes: &'a VoteLedger,
        reputation: &'a ReputationLedger,
    ) -> Self {
        Self {
            reports,
            votes,
            reputation,
        }
    }

    pub fn get_report(&self, report_id: u64) -> LedgerResult<ReportView> {
        self.reports.get(report_id).map(ReportView::from)
    }

    pub fn get_user_profile(&self, identity: &Identity) -> UserProfile {
        self.reputation.get_profile(identity)
    }

    pub fn has_voted(&self, report_id: u64, identity: &Identity) -> bool {
        self.votes.has_voted(report_id, identity)
    }

    /// Reports with ids `offset + 1 ..= offset + limit`, clamped to the count
    pub fn get_all_reports(&self, offset: u64, limit: u64) -> LedgerResult<Page> {
        let total = self.reports.count();
        paginate(self.reports.iter(), total, offset, limit)
    }

    /// Reports filed by `identity`, in creation order.
    ///
    /// Scans every report twice: once to count, once to slice.
    pub fn get_user_reports(
        &self,
        identity: &Identity,
        offset: u64,
        limit: u64,
    ) -> LedgerResult<Page> {
        let total = self
            .reports
            .iter()
            .filter(|report| &report.reporter == identity)
            .count() as u64;

        paginate(
            self.reports
                .iter()
                .filter(|report| &report.reporter == identity),
            total,
            offset,
            limit,
        )
    }
}

fn paginate<'r>(
    reports: impl Iterator<Item = &'r Report>,
    total: u64,
    offset: u64,
    limit: u64,
) -> LedgerResult<Page> {
    if offset > total {
        return Err(LedgerError::OffsetOutOfBounds { offset, total });
    }

    let items = reports
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .map(ReportView::from)
        .collect();

    Ok(Page { items, total })
}
