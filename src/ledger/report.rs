//! Report entities and the identifier-allocating store
//!
//! Identifiers are dense: the report with id `n` lives at index `n - 1`, so
//! the highest assigned id always equals the number of reports.

use crate::error::{LedgerError, LedgerResult};
use crate::types::{Identity, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Lifecycle of a report. Solved and Flagged are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Active,
    Solved,
    Flagged,
}

impl ReportStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Solved | ReportStatus::Flagged)
    }
}

/// Caller-provided fields of a new report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReport {
    pub details: String,
    pub location: String,
    pub media_ref: String,
    pub category: String,
    /// 1 (lowest) to 5 (highest)
    pub priority: u8,
}

/// A stored report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: u64,
    /// SHA-256 of location, media reference and category (hex)
    pub content_fingerprint: String,
    pub details: String,
    pub location: String,
    pub media_ref: String,
    pub category: String,
    pub priority: u8,
    pub created_at: Timestamp,
    pub status: ReportStatus,
    pub reporter: Identity,
    pub upvotes: u64,
    pub downvotes: u64,
}

impl Report {
    pub fn is_solved(&self) -> bool {
        self.status == ReportStatus::Solved
    }

    pub fn is_active(&self) -> bool {
        self.status == ReportStatus::Active
    }
}

/// Read-only projection handed out by queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportView {
    pub id: u64,
    pub content_fingerprint: String,
    pub details: String,
    pub location: String,
    pub media_ref: String,
    pub category: String,
    pub priority: u8,
    pub created_at: Timestamp,
    pub status: ReportStatus,
    pub is_solved: bool,
    pub reporter: Identity,
    pub upvotes: u64,
    pub downvotes: u64,
}

impl From<&Report> for ReportView {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id,
            content_fingerprint: report.content_fingerprint.clone(),
            details: report.details.clone(),
            location: report.location.clone(),
            media_ref: report.media_ref.clone(),
            category: report.category.clone(),
            priority: report.priority,
            created_at: report.created_at,
            status: report.status,
            is_solved: report.is_solved(),
            reporter: report.reporter.clone(),
            upvotes: report.upvotes,
            downvotes: report.downvotes,
        }
    }
}

/// Deterministic fingerprint over `location ‖ media_ref ‖ category`.
///
/// Stored on the report only; nothing checks it for uniqueness.
pub fn content_fingerprint(location: &str, media_ref: &str, category: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(location.as_bytes());
    hasher.update(media_ref.as_bytes());
    hasher.update(category.as_bytes());
    hex::encode(hasher.finalize())
}

/// Owns every report, in identifier order
#[derive(Debug, Default)]
pub struct ReportStore {
    reports: Vec<Report>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new Active report under the next identifier.
    ///
    /// Performs no validation.
    pub fn create(&mut self, fields: NewReport, reporter: &Identity, now: Timestamp) -> u64 {
        let id = self.count() + 1;
        let content_fingerprint =
            content_fingerprint(&fields.location, &fields.media_ref, &fields.category);

        self.reports.push(Report {
            id,
            content_fingerprint,
            details: fields.details,
            location: fields.location,
            media_ref: fields.media_ref,
            category: fields.category,
            priority: fields.priority,
            created_at: now,
            status: ReportStatus::Active,
            reporter: reporter.clone(),
            upvotes: 0,
            downvotes: 0,
        });

        debug!(report_id = id, reporter = %reporter, "Stored report");

        id
    }

    pub fn get(&self, id: u64) -> LedgerResult<&Report> {
        Self::index(id)
            .and_then(|idx| self.reports.get(idx))
            .ok_or(LedgerError::NotFound(id))
    }

    /// Mutable access is reserved for the state machine
    pub(crate) fn get_mut(&mut self, id: u64) -> LedgerResult<&mut Report> {
        Self::index(id)
            .and_then(|idx| self.reports.get_mut(idx))
            .ok_or(LedgerError::NotFound(id))
    }

    /// Number of reports, equal to the highest assigned identifier
    pub fn count(&self) -> u64 {
        self.reports.len() as u64
    }

    /// All reports in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &Report> {
        self.reports.iter()
    }

    fn index(id: u64) -> Option<usize> {
        id.checked_sub(1).and_then(|idx| usize::try_from(idx).ok())
    }
}
