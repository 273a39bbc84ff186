//! Bilateral transaction models

use crate::types::PartyId;
use serde::{Deserialize, Serialize};

/// A directed value transfer between two counterparties, immutable once
/// appended to the global log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub sender: PartyId,
    pub receiver: PartyId,
    /// Signed, non-zero
    pub value: i64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
