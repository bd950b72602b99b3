//! Reputation Ledger
//!
//! Per-identity point balances and submission counters.
//!
//! ## Point Model
//!
//! ```text
//! submission  ──► +100  "Report submission"
//! upvote      ──► +2    "Received upvote"      (credited to the reporter)
//! downvote    ──► -400  "Received downvote"    (debited from the reporter)
//! solved      ──► +20   "Report solved"
//! self-flag   ──► -400  "Report is Flagged"
//! ```
//!
//! - Profiles are created lazily with every field zero
//! - Credits are plain sums, debits saturate at zero
//! - Every balance change yields a `PointsUpdated` notification carrying the
//!   new total, not the delta

mod ledger;
mod points;
mod profile;

pub use ledger::ReputationLedger;
pub use points::{
    PointsDelta, PointsReason, DOWNVOTE_PENALTY, REPORT_POINTS, SOLVE_POINTS, UPVOTE_POINTS,
};
pub use profile::UserProfile;
