//! Point amounts and the reasons attached to balance changes

use serde::{Deserialize, Serialize};

/// Credited to the reporter for every accepted submission
pub const REPORT_POINTS: u64 = 100;

/// Credited to the reporter for every upvote received
pub const UPVOTE_POINTS: u64 = 2;

/// Debited from the reporter for every downvote received, and for self-flagging
pub const DOWNVOTE_PENALTY: u64 = 400;

/// Credited to the reporter when they mark their report solved
pub const SOLVE_POINTS: u64 = 20;

/// Why a balance changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointsReason {
    #[serde(rename = "Report submission")]
    ReportSubmission,

    #[serde(rename = "Received upvote")]
    ReceivedUpvote,

    #[serde(rename = "Received downvote")]
    ReceivedDownvote,

    #[serde(rename = "Report solved")]
    ReportSolved,

    #[serde(rename = "Report is Flagged")]
    ReportFlagged,
}

impl PointsReason {
    /// Human-readable label carried in notifications
    pub fn label(&self) -> &'static str {
        match self {
            PointsReason::ReportSubmission => "Report submission",
            PointsReason::ReceivedUpvote => "Received upvote",
            PointsReason::ReceivedDownvote => "Received downvote",
            PointsReason::ReportSolved => "Report solved",
            PointsReason::ReportFlagged => "Report is Flagged",
        }
    }
}

/// Signed balance change. Debits saturate at zero when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsDelta {
    Credit(u64),
    Debit(u64),
}

impl PointsDelta {
    /// Apply to a balance
    pub fn apply(self, balance: u64) -> u64 {
        match self {
            PointsDelta::Credit(amount) => balance.saturating_add(amount),
            PointsDelta::Debit(amount) => balance.saturating_sub(amount),
        }
    }
}
