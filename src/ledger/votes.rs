//! Vote deduplication ledger

use crate::types::{Identity, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A cast vote. Presence alone is what blocks a second vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub is_upvote: bool,
    pub cast_at: Timestamp,
}

/// Write-once (report, voter) guard
#[derive(Debug, Default)]
pub struct VoteLedger {
    /// report_id -> voter -> record
    votes: HashMap<u64, HashMap<Identity, VoteRecord>>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, report_id: u64, voter: &Identity) -> bool {
        self.get_vote(report_id, voter).is_some()
    }

    pub fn get_vote(&self, report_id: u64, voter: &Identity) -> Option<&VoteRecord> {
        self.votes.get(&report_id).and_then(|voters| voters.get(voter))
    }

    /// Record a vote. Callers check `has_voted` first; an existing record is
    /// never overwritten, and `false` is returned in that case.
    pub fn record_vote(
        &mut self,
        report_id: u64,
        voter: &Identity,
        is_upvote: bool,
        cast_at: Timestamp,
    ) -> bool {
        let voters = self.votes.entry(report_id).or_default();
        if voters.contains_key(voter) {
            return false;
        }
        voters.insert(voter.clone(), VoteRecord { is_upvote, cast_at });
        true
    }

    /// Number of votes recorded for a report
    pub fn votes_for(&self, report_id: u64) -> usize {
        self.votes.get(&report_id).map(HashMap::len).unwrap_or(0)
    }
}
