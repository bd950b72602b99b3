//! Ledger error kinds
//!
//! Every variant is a synchronous precondition failure. The operation that
//! returns one has applied no mutation and emitted no notification.

/// Errors surfaced by ledger operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Priority outside the accepted range
    #[error("Priority {0} is outside the accepted range 1..=5")]
    InvalidPriority(u8),

    /// Reporter submitted too recently
    #[error("Submission cooldown active: {remaining_secs}s remaining")]
    CooldownActive { remaining_secs: i64 },

    /// No report with this identifier
    #[error("Report {0} not found")]
    NotFound(u64),

    /// Voter already cast a vote on this report
    #[error("Already voted on report {0}")]
    AlreadyVoted(u64),

    /// Reporters cannot vote on their own reports
    #[error("Cannot vote on your own report {0}")]
    SelfVoteForbidden(u64),

    /// Report is Solved or Flagged and accepts no more votes
    #[error("Report {0} is no longer active")]
    ReportTerminal(u64),

    /// Caller did not create the report
    #[error("Only the reporter can change the status of report {0}")]
    NotReporter(u64),

    /// Report is not Active
    #[error("Report {0} is not active")]
    NotActive(u64),

    /// Report is already Solved
    #[error("Report {0} is already solved")]
    AlreadySolved(u64),

    /// Pagination offset past the end of the result set
    #[error("Offset {offset} exceeds total {total}")]
    OffsetOutOfBounds { offset: u64, total: u64 },
}

impl LedgerError {
    /// Stable machine-readable label
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::InvalidPriority(_) => "InvalidPriority",
            LedgerError::CooldownActive { .. } => "CooldownActive",
            LedgerError::NotFound(_) => "NotFound",
            LedgerError::AlreadyVoted(_) => "AlreadyVoted",
            LedgerError::SelfVoteForbidden(_) => "SelfVoteForbidden",
            LedgerError::ReportTerminal(_) => "ReportTerminal",
            LedgerError::NotReporter(_) => "NotReporter",
            LedgerError::NotActive(_) => "NotActive",
            LedgerError::AlreadySolved(_) => "AlreadySolved",
            LedgerError::OffsetOutOfBounds { .. } => "OffsetOutOfBounds",
        }
    }
}

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_labels() {
        assert_eq!(LedgerError::NotFound(3).kind(), "NotFound");
        assert_eq!(
            LedgerError::OffsetOutOfBounds { offset: 5, total: 3 }.kind(),
            "OffsetOutOfBounds"
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(LedgerError::AlreadyVoted(7).to_string(), "Already voted on report 7");
        assert_eq!(
            LedgerError::CooldownActive { remaining_secs: 10 }.to_string(),
            "Submission cooldown active: 10s remaining"
        );
    }
}
