//! Bilateral transaction ledger
//!
//! Global append-only log of directed transfers plus a signed-exposure
//! matrix keyed by (sender, receiver). Matrix entries are independent per
//! direction and are never netted against each other.

use riskdesk_core::{PartyId, TransactionRecord};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct TransactionLedger {
    log: Vec<TransactionRecord>,
    matrix: HashMap<(PartyId, PartyId), i64>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a directed transfer into the matrix and append it to the global
    /// log
    pub fn record(&mut self, sender: PartyId, receiver: PartyId, value: i64) {
        *self
            .matrix
            .entry((sender.clone(), receiver.clone()))
            .or_insert(0) += value;
        self.log.push(TransactionRecord {
            sender,
            receiver,
            value,
            timestamp: chrono::Utc::now(),
        });
    }

    /// The global transaction log, in recording order
    pub fn log(&self) -> &[TransactionRecord] {
        &self.log
    }

    /// Running signed sum of all recorded transfers from `sender` to
    /// `receiver`
    pub fn bilateral(&self, sender: &PartyId, receiver: &PartyId) -> i64 {
        self.matrix
            .get(&(sender.clone(), receiver.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Log entries where the given party is sender or receiver
    ///
    /// The iterator borrows only from the ledger, not from `id`.
    pub fn for_party<'a>(
        &'a self,
        id: &PartyId,
    ) -> impl Iterator<Item = &'a TransactionRecord> + 'a {
        let id = id.clone();
        self.log
            .iter()
            .filter(move |t| t.sender == id || t.receiver == id)
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}
