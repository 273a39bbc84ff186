//! Risk metrics
//!
//! Pure integer computations over a counterparty snapshot. All divisions
//! truncate; a ratio over zero exposure is an arithmetic error rather than
//! a silent default.

use riskdesk_core::{Counterparty, Error, Result};

/// Collateral as a truncated integer percentage of current exposure
///
/// Undefined (arithmetic error) when current exposure is zero.
pub fn coverage_ratio(c: &Counterparty) -> Result<i64> {
    if c.current_exposure == 0 {
        return Err(Error::Arithmetic(
            "coverage ratio undefined: current exposure is zero".into(),
        ));
    }
    Ok(c.collateral * 100 / c.current_exposure)
}

/// Normalized risk figure combining exposure, limit, and credit score
pub fn risk_score(c: &Counterparty) -> Result<i64> {
    if c.exposure_limit <= 0 {
        return Err(Error::Arithmetic(
            "risk score undefined: exposure limit is not positive".into(),
        ));
    }
    if c.credit_score == 0 {
        return Err(Error::Arithmetic(
            "risk score undefined: credit score is zero".into(),
        ));
    }
    Ok(c.current_exposure * 10_000 / c.exposure_limit / c.credit_score as i64)
}

/// Guarantee as a percentage of current exposure; 100 when exposure is zero
pub fn guarantee_ratio(c: &Counterparty) -> i64 {
    if c.current_exposure == 0 {
        100
    } else {
        c.guarantee * 100 / c.current_exposure
    }
}

/// Expected loss given probability of default and loss-given-default, both
/// integer percentages in 0..=100
pub fn expected_loss(c: &Counterparty, pd: i64, lgd: i64) -> Result<i64> {
    if !(0..=100).contains(&pd) {
        return Err(Error::Validation(format!(
            "probability of default out of range: {}",
            pd
        )));
    }
    if !(0..=100).contains(&lgd) {
        return Err(Error::Validation(format!(
            "loss given default out of range: {}",
            lgd
        )));
    }
    c.current_exposure
        .checked_mul(pd)
        .and_then(|scaled| scaled.checked_mul(lgd))
        .map(|scaled| scaled / 10_000)
        .ok_or_else(|| {
            Error::Arithmetic(format!(
                "expected loss overflow for exposure {}",
                c.current_exposure
            ))
        })
}

/// Signed sum over the position history: +amount for LONG, -amount for SHORT
pub fn net_exposure(c: &Counterparty) -> i64 {
    c.net_exposure()
}

#[cfg(test)]
mod tests {
    use super::*;
    use riskdesk_core::{Direction, PartyId, Position};

    fn party(exposure: i64, collateral: i64, guarantee: i64) -> Counterparty {
        Counterparty {
            id: PartyId::from("test"),
            credit_score: 50,
            exposure_limit: 1_000,
            current_exposure: exposure,
            collateral,
            guarantee,
            penalties: 0,
            active: true,
            position_history: Vec::new(),
            registered_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_coverage_ratio_truncates() {
        // 500 * 100 / 300 = 166.66 -> 166
        assert_eq!(coverage_ratio(&party(300, 500, 0)).unwrap(), 166);
    }

    #[test]
    fn test_coverage_ratio_undefined_at_zero_exposure() {
        assert!(matches!(
            coverage_ratio(&party(0, 500, 0)),
            Err(Error::Arithmetic(_))
        ));
    }

    #[test]
    fn test_risk_score_formula() {
        // (600 * 10000 / 1000) / 50 = 120
        assert_eq!(risk_score(&party(600, 0, 0)).unwrap(), 120);
    }

    #[test]
    fn test_guarantee_ratio_full_when_no_exposure() {
        assert_eq!(guarantee_ratio(&party(0, 0, 0)), 100);
        assert_eq!(guarantee_ratio(&party(400, 0, 100)), 25);
    }

    #[test]
    fn test_expected_loss_bounds_inputs() {
        let c = party(10_000, 0, 0);
        // 10000 * 20 * 40 / 10000 = 800
        assert_eq!(expected_loss(&c, 20, 40).unwrap(), 800);
        assert!(expected_loss(&c, 101, 40).is_err());
        assert!(expected_loss(&c, 20, -1).is_err());
    }

    #[test]
    fn test_expected_loss_overflow_is_arithmetic_error() {
        let c = party(i64::MAX, 0, 0);
        assert!(matches!(
            expected_loss(&c, 100, 100),
            Err(Error::Arithmetic(_))
        ));
    }

    #[test]
    fn test_net_exposure_signs_by_direction() {
        let mut c = party(0, 0, 0);
        let now = chrono::Utc::now();
        c.position_history.push(Position {
            amount: 300,
            direction: Direction::Long,
            collateral_required: 0,
            timestamp: now,
        });
        c.position_history.push(Position {
            amount: 100,
            direction: Direction::Short,
            collateral_required: 120,
            timestamp: now,
        });
        assert_eq!(net_exposure(&c), 200);
    }
}
