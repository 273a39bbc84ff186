//! Shared type definitions and newtypes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque principal identity of a counterparty
///
/// The empty string is the null identity and never names a registered
/// counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartyId(pub String);

impl PartyId {
    /// The null identity (no registered counterparty)
    pub fn null() -> Self {
        PartyId(String::new())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PartyId {
    fn from(s: &str) -> Self {
        PartyId(s.to_string())
    }
}
