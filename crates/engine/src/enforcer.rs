//! Limit enforcement
//!
//! Runs synchronously after every exposure-affecting mutation has already
//! committed. Enforcement never rolls the triggering mutation back:
//! deactivation and penalties are layered on top, so a single call can both
//! succeed and deactivate its own subject.

use crate::audit::AuditLog;
use crate::metrics;
use riskdesk_core::{AuditEvent, Counterparty};

/// Exposure above the limit is penalized at this multiplier
const PENALTY_MULTIPLIER: i64 = 10;
/// Coverage below this percentage raises an alert
const COVERAGE_ALERT_PCT: i64 = 100;
/// Guarantee below this percentage raises a high-risk alert
const GUARANTEE_ALERT_PCT: i64 = 50;
/// Risk scores above this threshold raise a high-risk alert
const RISK_SCORE_ALERT: i64 = 200;

/// Evaluate one counterparty against its limit and coverage thresholds
///
/// A first breach immediately deactivates the counterparty and accrues
/// `(exposure - limit) * 10` into its penalty accumulator.
pub fn enforce(party: &mut Counterparty, audit: &mut AuditLog) {
    if party.current_exposure > party.exposure_limit {
        party.active = false;
        let penalty = (party.current_exposure - party.exposure_limit) * PENALTY_MULTIPLIER;
        party.penalties += penalty;
        audit.append(AuditEvent::LimitExceeded {
            id: party.id.clone(),
            current_exposure: party.current_exposure,
            exposure_limit: party.exposure_limit,
        });
        audit.append(AuditEvent::PenaltyApplied {
            id: party.id.clone(),
            penalty,
            total_penalties: party.penalties,
        });
    }

    if party.current_exposure > 0 {
        if let Ok(ratio) = metrics::coverage_ratio(party) {
            if ratio < COVERAGE_ALERT_PCT {
                audit.append(AuditEvent::InsufficientCoverage {
                    id: party.id.clone(),
                    coverage_ratio: ratio,
                });
            }
        }
        let guarantee = metrics::guarantee_ratio(party);
        if guarantee < GUARANTEE_ALERT_PCT {
            audit.append(AuditEvent::InsufficientGuarantee {
                id: party.id.clone(),
                guarantee_ratio: guarantee,
            });
        }
    }

    if let Ok(score) = metrics::risk_score(party) {
        if score > RISK_SCORE_ALERT {
            audit.append(AuditEvent::HighRiskAlert {
                id: party.id.clone(),
                risk_score: score,
            });
        }
    }
}
