//! External value movement
//!
//! The engine treats actual value transfer as an opaque primitive behind
//! the `ValueMover` trait: move funds from sender to receiver, report
//! success or failure. `CashAccounts` is the in-process implementation
//! used by the operator console and the tests.

use riskdesk_core::{Error, PartyId, Result};
use std::collections::HashMap;

/// Opaque "send funds to recipient" primitive
pub trait ValueMover {
    /// Move `amount` from `sender` to `receiver`; an error means nothing
    /// moved
    fn transfer(&mut self, sender: &PartyId, receiver: &PartyId, amount: i64) -> Result<()>;
}

/// Simple in-process cash ledger keyed by party id
#[derive(Debug, Default)]
pub struct CashAccounts {
    balances: HashMap<PartyId, i64>,
}

impl CashAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a party's transferable balance
    pub fn fund(&mut self, id: PartyId, amount: i64) {
        *self.balances.entry(id).or_insert(0) += amount;
    }

    pub fn balance(&self, id: &PartyId) -> i64 {
        self.balances.get(id).copied().unwrap_or(0)
    }
}

impl ValueMover for CashAccounts {
    fn transfer(&mut self, sender: &PartyId, receiver: &PartyId, amount: i64) -> Result<()> {
        let available = self.balance(sender);
        if available < amount {
            return Err(Error::Transfer(format!(
                "insufficient transferable balance for {}: required {}, available {}",
                sender, amount, available
            )));
        }
        *self.balances.entry(sender.clone()).or_insert(0) -= amount;
        *self.balances.entry(receiver.clone()).or_insert(0) += amount;
        Ok(())
    }
}

/// Mover that always fails; used to exercise external-failure paths in
/// tests
#[cfg(test)]
pub struct FailingMover;

#[cfg(test)]
impl ValueMover for FailingMover {
    fn transfer(&mut self, _sender: &PartyId, _receiver: &PartyId, _amount: i64) -> Result<()> {
        Err(Error::Transfer("external transfer rejected".into()))
    }
}
