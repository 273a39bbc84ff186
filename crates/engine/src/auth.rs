//! Authorization context
//!
//! Capability checks are injected per call instead of comparing against a
//! process-global admin identity. Registry, position, collateral, guarantee,
//! and configuration operations require the admin capability; bilateral
//! transaction operations accept the admin or either involved party.

use riskdesk_core::{Error, PartyId, Result};

/// Capability carried by the caller of a mutating operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// The operator principal; passes every check
    Admin,
    /// A single counterparty acting for itself
    Party(PartyId),
}

impl AuthContext {
    pub fn require_admin(&self) -> Result<()> {
        match self {
            AuthContext::Admin => Ok(()),
            AuthContext::Party(id) => Err(Error::Authorization(format!(
                "operation requires admin capability, caller is party {}",
                id
            ))),
        }
    }

    /// Caller must be the admin or one of the two involved counterparties
    pub fn require_party(&self, sender: &PartyId, receiver: &PartyId) -> Result<()> {
        match self {
            AuthContext::Admin => Ok(()),
            AuthContext::Party(id) if id == sender || id == receiver => Ok(()),
            AuthContext::Party(id) => Err(Error::Authorization(format!(
                "caller {} is not a party to this transaction",
                id
            ))),
        }
    }
}
