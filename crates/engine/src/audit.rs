//! In-memory audit stream
//!
//! Totally ordered, append-only. Every append is also emitted as a tracing
//! line so operators see the same stream in the logs that external
//! observers consume from the records.

use riskdesk_core::{AuditEvent, AuditRecord};
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
    next_seq: u64,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_seq: 1,
        }
    }

    /// Append an event, assigning the next sequence number
    pub fn append(&mut self, event: AuditEvent) {
        if event.is_alert() {
            warn!(event = event.name(), "audit: {:?}", event);
        } else {
            info!(event = event.name(), "audit: {:?}", event);
        }
        self.records.push(AuditRecord {
            seq: self.next_seq,
            timestamp: chrono::Utc::now(),
            event,
        });
        self.next_seq += 1;
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Records strictly after the given sequence number (a drain cursor for
    /// persistence sinks)
    pub fn since(&self, seq: u64) -> &[AuditRecord] {
        let start = self.records.partition_point(|r| r.seq <= seq);
        &self.records[start..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
