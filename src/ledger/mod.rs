//! Report Ledger
//!
//! Reports, votes and the state machine that ties them to reputation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌────────────┐   ┌──────────────────┐
//! │ ReportStore │   │ VoteLedger │   │ ReputationLedger │
//! └──────┬──────┘   └─────┬──────┘   └────────┬─────────┘
//!        │                │                   │
//!        └────────┬───────┴───────────────────┘
//!                 ▼
//!      ┌────────────────────┐        ┌──────────┐
//!      │ ReportStateMachine │───────►│ EventLog │
//!      └─────────┬──────────┘        └──────────┘
//!                │ queries()
//!                ▼
//!      ┌────────────────────┐
//!      │    QueryService    │  (read-only)
//!      └────────────────────┘
//! ```
//!
//! `LedgerService` wraps the state machine in a single `RwLock` so that
//! mutations are fully serialized and reads see consistent snapshots.

mod machine;
mod query;
mod report;
mod rules;
mod service;
mod votes;

pub use machine::ReportStateMachine;
pub use query::{Page, QueryService};
pub use report::{content_fingerprint, NewReport, Report, ReportStatus, ReportStore, ReportView};
pub use rules::{
    LedgerRules, COOLDOWN_SECS, FLAG_DOWNVOTE_RATIO, FLAG_MIN_DOWNVOTES, MAX_PRIORITY,
    MIN_PRIORITY,
};
pub use service::LedgerService;
pub use votes::{VoteLedger, VoteRecord};
