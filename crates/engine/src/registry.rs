//! Counterparty registry
//!
//! Owns the id -> counterparty map and the ordered list of registered
//! identities. Deactivation is terminal; a deactivated id stays registered
//! and cannot be re-registered.

use riskdesk_core::{Counterparty, CounterpartySummary, Error, PartyId, Result};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CounterpartyRegistry {
    parties: HashMap<PartyId, Counterparty>,
    /// Registration order
    order: Vec<PartyId>,
}

impl CounterpartyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new active counterparty with zero exposure, penalties, and
    /// guarantee
    pub fn register(
        &mut self,
        id: PartyId,
        credit_score: u32,
        exposure_limit: i64,
        collateral: i64,
    ) -> Result<&Counterparty> {
        if id.is_null() {
            return Err(Error::Validation("counterparty id is null".into()));
        }
        if self.parties.contains_key(&id) {
            return Err(Error::State(format!("counterparty {} already registered", id)));
        }
        if !(1..=100).contains(&credit_score) {
            return Err(Error::Validation(format!(
                "credit score must be in 1..=100, got {}",
                credit_score
            )));
        }
        if exposure_limit <= 0 {
            return Err(Error::Validation(format!(
                "exposure limit must be positive, got {}",
                exposure_limit
            )));
        }
        if collateral < 0 {
            return Err(Error::Validation(format!(
                "collateral must be non-negative, got {}",
                collateral
            )));
        }

        let party = Counterparty {
            id: id.clone(),
            credit_score,
            exposure_limit,
            current_exposure: 0,
            collateral,
            guarantee: 0,
            penalties: 0,
            active: true,
            position_history: Vec::new(),
            registered_at: chrono::Utc::now(),
        };
        self.parties.insert(id.clone(), party);
        self.order.push(id.clone());
        Ok(&self.parties[&id])
    }

    /// Flip an active counterparty to inactive (terminal)
    pub fn deactivate(&mut self, id: &PartyId) -> Result<()> {
        let party = self
            .parties
            .get_mut(id)
            .ok_or_else(|| Error::State(format!("unknown counterparty {}", id)))?;
        if !party.active {
            return Err(Error::State(format!("counterparty {} already inactive", id)));
        }
        party.active = false;
        Ok(())
    }

    pub fn get(&self, id: &PartyId) -> Result<&Counterparty> {
        self.parties
            .get(id)
            .ok_or_else(|| Error::State(format!("unknown counterparty {}", id)))
    }

    pub fn get_mut(&mut self, id: &PartyId) -> Result<&mut Counterparty> {
        self.parties
            .get_mut(id)
            .ok_or_else(|| Error::State(format!("unknown counterparty {}", id)))
    }

    /// Lookup that additionally requires the counterparty to be active
    pub fn require_active(&self, id: &PartyId) -> Result<&Counterparty> {
        let party = self.get(id)?;
        if !party.active {
            return Err(Error::State(format!("counterparty {} is inactive", id)));
        }
        Ok(party)
    }

    /// Mutable lookup that additionally requires the counterparty to be
    /// active
    pub fn require_active_mut(&mut self, id: &PartyId) -> Result<&mut Counterparty> {
        let party = self
            .parties
            .get_mut(id)
            .ok_or_else(|| Error::State(format!("unknown counterparty {}", id)))?;
        if !party.active {
            return Err(Error::State(format!("counterparty {} is inactive", id)));
        }
        Ok(party)
    }

    /// Lazy, restartable sequence of snapshots in registration order
    pub fn list(&self) -> impl Iterator<Item = CounterpartySummary> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.parties.get(id))
            .map(CounterpartySummary::from)
    }
}
