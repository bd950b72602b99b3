//! Ledger notifications
//!
//! Every committed mutation produces one or more `LedgerEvent`s. They are
//! kept in a bounded history (for late readers such as the CLI) and fanned
//! out on a broadcast channel to live subscribers (indexers, UIs).
//! Events are published only after the whole operation has been applied.

use crate::ledger::ReportStatus;
use crate::reputation::PointsReason;
use crate::types::Identity;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Default number of events retained in history
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// Default broadcast buffer per subscriber
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1_024;

/// Notification describing a committed change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    ReportSubmitted {
        report_id: u64,
        reporter: Identity,
    },
    ReportVoted {
        report_id: u64,
        voter: Identity,
        is_upvote: bool,
    },
    ReportStatusUpdated {
        report_id: u64,
        new_status: ReportStatus,
    },
    PointsUpdated {
        identity: Identity,
        new_total: u64,
        reason: PointsReason,
    },
}

/// Event with its position in the ledger's notification stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing, starting at 1
    pub sequence: u64,
    pub event: LedgerEvent,
}

/// Bounded notification history plus broadcast fan-out
pub struct EventLog {
    history: VecDeque<EventRecord>,
    max_entries: usize,
    next_sequence: u64,
    sender: broadcast::Sender<EventRecord>,
}

impl EventLog {
    pub fn new(max_entries: usize, channel_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            history: VecDeque::new(),
            max_entries,
            next_sequence: 1,
            sender,
        }
    }

    /// Publish the notifications of one committed operation, in order
    pub fn publish(&mut self, events: Vec<LedgerEvent>) {
        for event in events {
            match &event {
                LedgerEvent::ReportStatusUpdated { report_id, new_status } => {
                    info!(report_id, status = ?new_status, "Report status updated");
                }
                other => debug!(event = ?other, "Ledger event"),
            }

            let record = EventRecord {
                sequence: self.next_sequence,
                event,
            };
            self.next_sequence += 1;

            // No live subscribers is not an error
            let _ = self.sender.send(record.clone());

            self.history.push_back(record);
            while self.history.len() > self.max_entries {
                self.history.pop_front();
            }
        }
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    /// Most recent `limit` events, oldest first
    pub fn recent(&self, limit: usize) -> Vec<EventRecord> {
        let skip = self.history.len().saturating_sub(limit);
        self.history.iter().skip(skip).cloned().collect()
    }

    /// Sequence number of the last published event (0 if none)
    pub fn last_sequence(&self) -> u64 {
        self.next_sequence - 1
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, DEFAULT_CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted(id: u64) -> LedgerEvent {
        LedgerEvent::ReportSubmitted {
            report_id: id,
            reporter: Identity::from("alice"),
        }
    }

    #[test]
    fn test_history_is_bounded() {
        let mut log = EventLog::new(2, 8);
        log.publish(vec![submitted(1), submitted(2), submitted(3)]);

        let recent = log.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].sequence, 2);
        assert_eq!(recent[1].sequence, 3);
        assert_eq!(log.last_sequence(), 3);
    }

    #[test]
    fn test_subscriber_receives_published_events() {
        let mut log = EventLog::default();
        let mut rx = log.subscribe();

        log.publish(vec![submitted(1)]);

        let record = rx.try_recv().unwrap();
        assert_eq!(record.sequence, 1);
        assert_eq!(record.event, submitted(1));
    }

    #[test]
    fn test_event_json_shape() {
        let event = LedgerEvent::PointsUpdated {
            identity: Identity::from("alice"),
            new_total: 120,
            reason: PointsReason::ReportSolved,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PointsUpdated");
        assert_eq!(json["new_total"], 120);
        assert_eq!(json["reason"], "Report solved");
    }
}
