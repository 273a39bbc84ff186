//! Counterparty state

use crate::models::position::{Direction, Position};
use crate::types::PartyId;
use serde::{Deserialize, Serialize};

/// A registered trading counterparty
///
/// Invariants held after every completed operation:
/// credit_score in 1..=100, exposure_limit > 0, and collateral, guarantee,
/// current_exposure and penalties all non-negative. `active: false` is
/// terminal; no operation reactivates a counterparty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counterparty {
    pub id: PartyId,
    /// 1..=100; only ever decreased, floored at 1
    pub credit_score: u32,
    pub exposure_limit: i64,
    pub current_exposure: i64,
    /// Available (unlocked) collateral balance
    pub collateral: i64,
    /// Secondary coverage figure, tracked independently of collateral
    pub guarantee: i64,
    /// Monotonically non-decreasing penalty accumulator
    pub penalties: i64,
    pub active: bool,
    /// Append-only; insertion order is chronological order
    pub position_history: Vec<Position>,
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

impl Counterparty {
    /// Signed sum over the position history: +amount for LONG, -amount for
    /// SHORT
    pub fn net_exposure(&self) -> i64 {
        self.position_history
            .iter()
            .map(|p| match p.direction {
                Direction::Long => p.amount,
                Direction::Short => -p.amount,
            })
            .sum()
    }
}

/// Registry listing snapshot for one counterparty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartySummary {
    pub id: PartyId,
    pub exposure_limit: i64,
    pub current_exposure: i64,
}

impl From<&Counterparty> for CounterpartySummary {
    fn from(c: &Counterparty) -> Self {
        Self {
            id: c.id.clone(),
            exposure_limit: c.exposure_limit,
            current_exposure: c.current_exposure,
        }
    }
}
