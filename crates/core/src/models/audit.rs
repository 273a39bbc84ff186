//! Audit stream models
//!
//! Every successful state-changing operation emits one primary audit event;
//! the limit enforcer layers alert events on top. Records form a totally
//! ordered, append-only stream.

use crate::models::position::Direction;
use crate::types::PartyId;
use serde::{Deserialize, Serialize};

/// Structured audit event emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum AuditEvent {
    CounterpartyAdded {
        id: PartyId,
        credit_score: u32,
        exposure_limit: i64,
        collateral: i64,
    },
    CounterpartyDeactivated {
        id: PartyId,
    },
    PositionAdded {
        id: PartyId,
        amount: i64,
        direction: Direction,
        collateral_required: i64,
    },
    CollateralUpdated {
        id: PartyId,
        collateral: i64,
    },
    GuaranteeUpdated {
        id: PartyId,
        guarantee: i64,
    },
    CoverageRatioUpdated {
        coverage_ratio_pct: i64,
    },
    LimitExceeded {
        id: PartyId,
        current_exposure: i64,
        exposure_limit: i64,
    },
    PenaltyApplied {
        id: PartyId,
        penalty: i64,
        total_penalties: i64,
    },
    InsufficientCoverage {
        id: PartyId,
        coverage_ratio: i64,
    },
    InsufficientGuarantee {
        id: PartyId,
        guarantee_ratio: i64,
    },
    HighRiskAlert {
        id: PartyId,
        risk_score: i64,
    },
    OperationRecorded {
        sender: PartyId,
        receiver: PartyId,
        value: i64,
    },
    FundsSent {
        sender: PartyId,
        receiver: PartyId,
        amount: i64,
    },
}

impl AuditEvent {
    /// Event name as recorded in the audit stream
    pub fn name(&self) -> &'static str {
        match self {
            AuditEvent::CounterpartyAdded { .. } => "CounterpartyAdded",
            AuditEvent::CounterpartyDeactivated { .. } => "CounterpartyDeactivated",
            AuditEvent::PositionAdded { .. } => "PositionAdded",
            AuditEvent::CollateralUpdated { .. } => "CollateralUpdated",
            AuditEvent::GuaranteeUpdated { .. } => "GuaranteeUpdated",
            AuditEvent::CoverageRatioUpdated { .. } => "CoverageRatioUpdated",
            AuditEvent::LimitExceeded { .. } => "LimitExceeded",
            AuditEvent::PenaltyApplied { .. } => "PenaltyApplied",
            AuditEvent::InsufficientCoverage { .. } => "InsufficientCoverage",
            AuditEvent::InsufficientGuarantee { .. } => "InsufficientGuarantee",
            AuditEvent::HighRiskAlert { .. } => "HighRiskAlert",
            AuditEvent::OperationRecorded { .. } => "OperationRecorded",
            AuditEvent::FundsSent { .. } => "FundsSent",
        }
    }

    /// True for the enforcer's risk alerts (logged at warn level)
    pub fn is_alert(&self) -> bool {
        matches!(
            self,
            AuditEvent::LimitExceeded { .. }
                | AuditEvent::PenaltyApplied { .. }
                | AuditEvent::InsufficientCoverage { .. }
                | AuditEvent::InsufficientGuarantee { .. }
                | AuditEvent::HighRiskAlert { .. }
        )
    }
}

/// One entry of the totally ordered audit stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Monotonically increasing, gap-free sequence number
    pub seq: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event: AuditEvent,
}
