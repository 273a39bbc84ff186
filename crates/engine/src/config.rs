//! Engine configuration

use riskdesk_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default collateralization requirement for SHORT positions, in percent
pub const DEFAULT_COVERAGE_RATIO_PCT: i64 = 120;

/// Shared engine configuration
///
/// Mutable only through the admin-level reconfiguration operation on the
/// engine; the coverage ratio must stay strictly above 100%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Integer percentage applied when computing collateral required for a
    /// SHORT position
    pub coverage_ratio_pct: i64,
}

impl EngineConfig {
    pub fn new(coverage_ratio_pct: i64) -> Result<Self> {
        Self::validate_coverage_ratio(coverage_ratio_pct)?;
        Ok(Self { coverage_ratio_pct })
    }

    pub fn validate_coverage_ratio(pct: i64) -> Result<()> {
        if pct <= 100 {
            return Err(Error::Validation(format!(
                "coverage ratio must exceed 100 percent, got {}",
                pct
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            coverage_ratio_pct: DEFAULT_COVERAGE_RATIO_PCT,
        }
    }
}
