//! Position models

use serde::{Deserialize, Serialize};

/// Position direction
///
/// LONG increases a counterparty's net exposure, SHORT decreases it.
/// Closed enum: any other direction tag is rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LONG" => Ok(Direction::Long),
            "SHORT" => Ok(Direction::Short),
            other => Err(crate::Error::Validation(format!(
                "unknown position direction: {}",
                other
            ))),
        }
    }
}

/// A single booked position, immutable once appended to a counterparty's
/// history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub amount: i64,
    pub direction: Direction,
    /// Collateral locked when the position was booked (zero for LONG)
    pub collateral_required: i64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
