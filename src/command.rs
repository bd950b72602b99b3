//! Ledger commands for scripted replay
//!
//! One JSON object per line, tagged by `op`:
//!
//! ```text
//! {"op":"submit","reporter":"alice","details":"...","location":"...","media_ref":"...","category":"...","priority":3,"now":0}
//! {"op":"vote","report_id":1,"voter":"bob","upvote":false,"now":10}
//! {"op":"solve","report_id":1,"caller":"alice"}
//! {"op":"list_user_reports","identity":"alice","offset":0,"limit":10}
//! ```
//!
//! `now` is unix seconds. When omitted, the caller-supplied fallback clock is
//! used.

use crate::error::LedgerError;
use crate::ledger::{LedgerService, NewReport};
use crate::types::{Identity, Timestamp};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn default_limit() -> u64 {
    20
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LedgerCommand {
    Submit {
        reporter: Identity,
        details: String,
        location: String,
        #[serde(default)]
        media_ref: String,
        category: String,
        priority: u8,
        #[serde(default)]
        now: Option<i64>,
    },
    Vote {
        report_id: u64,
        voter: Identity,
        upvote: bool,
        #[serde(default)]
        now: Option<i64>,
    },
    Solve {
        report_id: u64,
        caller: Identity,
    },
    Flag {
        report_id: u64,
        caller: Identity,
    },
    GetReport {
        report_id: u64,
    },
    GetProfile {
        identity: Identity,
    },
    HasVoted {
        report_id: u64,
        identity: Identity,
    },
    ListReports {
        #[serde(default)]
        offset: u64,
        #[serde(default = "default_limit")]
        limit: u64,
    },
    ListUserReports {
        identity: Identity,
        #[serde(default)]
        offset: u64,
        #[serde(default = "default_limit")]
        limit: u64,
    },
}

/// Why a command could not be applied
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("Failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl CommandError {
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::Ledger(e) => e.kind(),
            CommandError::InvalidTimestamp(_) => "InvalidTimestamp",
            CommandError::Encode(_) => "Encode",
        }
    }
}

fn resolve_now(now: Option<i64>, clock: Timestamp) -> Result<Timestamp, CommandError> {
    match now {
        Some(secs) => DateTime::from_timestamp(secs, 0).ok_or(CommandError::InvalidTimestamp(secs)),
        None => Ok(clock),
    }
}

impl LedgerService {
    /// Apply one command and return its JSON result
    pub async fn execute(
        &self,
        command: LedgerCommand,
        clock: Timestamp,
    ) -> Result<Value, CommandError> {
        let value = match command {
            LedgerCommand::Submit {
                reporter,
                details,
                location,
                media_ref,
                category,
                priority,
                now,
            } => {
                let now = resolve_now(now, clock)?;
                let report = NewReport {
                    details,
                    location,
                    media_ref,
                    category,
                    priority,
                };
                let report_id = self.submit_report(report, &reporter, now).await?;
                json!({ "report_id": report_id })
            }
            LedgerCommand::Vote {
                report_id,
                voter,
                upvote,
                now,
            } => {
                let now = resolve_now(now, clock)?;
                self.vote_report(report_id, &voter, upvote, now).await?;
                json!({ "report_id": report_id, "voted": true })
            }
            LedgerCommand::Solve { report_id, caller } => {
                self.mark_report_solved(report_id, &caller).await?;
                json!({ "report_id": report_id, "status": "Solved" })
            }
            LedgerCommand::Flag { report_id, caller } => {
                self.mark_report_flagged(report_id, &caller).await?;
                json!({ "report_id": report_id, "status": "Flagged" })
            }
            LedgerCommand::GetReport { report_id } => {
                serde_json::to_value(self.get_report(report_id).await?)?
            }
            LedgerCommand::GetProfile { identity } => {
                serde_json::to_value(self.get_user_profile(&identity).await)?
            }
            LedgerCommand::HasVoted {
                report_id,
                identity,
            } => json!({ "has_voted": self.has_voted(report_id, &identity).await }),
            LedgerCommand::ListReports { offset, limit } => {
                serde_json::to_value(self.get_all_reports(offset, limit).await?)?
            }
            LedgerCommand::ListUserReports {
                identity,
                offset,
                limit,
            } => serde_json::to_value(self.get_user_reports(&identity, offset, limit).await?)?,
        };

        Ok(value)
    }
}
