//! Incident Ledger
//!
//! Community incident-reporting ledger: participants submit reports, other
//! participants vote on them, and every outcome feeds a per-participant
//! reputation balance.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── main.rs        - Replay CLI entrypoint
//! ├── config.rs      - Environment configuration
//! ├── error.rs       - Ledger error kinds
//! ├── events.rs      - Notifications (history + broadcast)
//! ├── command.rs     - JSON-lines commands for scripted replay
//! ├── types.rs       - Identity and timestamp types
//! ├── ledger/        - Reports, votes and the state machine
//! │   ├── report.rs  - Report entities & identifier allocation
//! │   ├── votes.rs   - Per-(report, voter) vote guard
//! │   ├── rules.rs   - Cooldown, point amounts, flag thresholds
//! │   ├── machine.rs - Submission/vote/solve/flag transitions
//! │   ├── query.rs   - Read-only paginated queries
//! │   └── service.rs - Serialized shared access
//! └── reputation/    - Point balances
//!     ├── points.rs  - Point amounts & reasons
//!     ├── profile.rs - Per-identity profile
//!     └── ledger.rs  - Profile store
//! ```
//!
//! Caller identity and the current time are always supplied by the caller;
//! the ledger neither authenticates identities nor reads the clock.

pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod reputation;
pub mod types;

// Re-export main types for convenience
pub use command::{CommandError, LedgerCommand};
pub use config::LedgerConfig;
pub use error::{LedgerError, LedgerResult};
pub use events::{EventLog, EventRecord, LedgerEvent};
pub use ledger::{
    LedgerRules, LedgerService, NewReport, Page, QueryService, Report, ReportStateMachine,
    ReportStatus, ReportStore, ReportView, VoteLedger, VoteRecord,
};
pub use reputation::{PointsDelta, PointsReason, ReputationLedger, UserProfile};
pub use types::{Identity, Timestamp};
