//! The risk engine façade
//!
//! `RiskEngine` owns the registry, the bilateral ledger, the configuration,
//! and the audit stream, and exposes the public operation surface. Every
//! mutating operation validates its preconditions in full before touching
//! any state, so a failed call commits nothing. Exposure-affecting
//! operations then run the limit enforcer on each affected counterparty
//! after the mutation has committed; enforcement is layered on top and is
//! never rolled back (a call can succeed and still deactivate its subject).
//!
//! `&mut self` receivers give the serial, one-call-at-a-time discipline:
//! an operation runs to completion before the next begins. Concurrent
//! callers go through [`crate::service::EngineService`].

use crate::audit::AuditLog;
use crate::auth::AuthContext;
use crate::config::EngineConfig;
use crate::enforcer;
use crate::ledger::TransactionLedger;
use crate::metrics;
use crate::registry::CounterpartyRegistry;
use crate::transfer::ValueMover;
use riskdesk_core::{
    AuditEvent, AuditRecord, Counterparty, CounterpartySummary, Direction, Error, PartyId,
    Position, Result, TransactionRecord,
};

#[derive(Debug, Default)]
pub struct RiskEngine {
    config: EngineConfig,
    registry: CounterpartyRegistry,
    ledger: TransactionLedger,
    audit: AuditLog,
}

impl RiskEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: CounterpartyRegistry::new(),
            ledger: TransactionLedger::new(),
            audit: AuditLog::new(),
        }
    }

    // ── registry operations ─────────────────────────────────────────────

    /// Onboard a counterparty (admin)
    pub fn register(
        &mut self,
        auth: &AuthContext,
        id: PartyId,
        credit_score: u32,
        exposure_limit: i64,
        collateral: i64,
    ) -> Result<()> {
        auth.require_admin()?;
        self.registry
            .register(id.clone(), credit_score, exposure_limit, collateral)?;
        self.audit.append(AuditEvent::CounterpartyAdded {
            id,
            credit_score,
            exposure_limit,
            collateral,
        });
        Ok(())
    }

    /// Explicitly deactivate a counterparty (admin); terminal
    pub fn deactivate(&mut self, auth: &AuthContext, id: &PartyId) -> Result<()> {
        auth.require_admin()?;
        self.registry.deactivate(id)?;
        self.audit
            .append(AuditEvent::CounterpartyDeactivated { id: id.clone() });
        Ok(())
    }

    /// Snapshots of all counterparties in registration order
    pub fn list(&self) -> impl Iterator<Item = CounterpartySummary> + '_ {
        self.registry.list()
    }

    // ── position ledger ─────────────────────────────────────────────────

    /// Book a position for a counterparty (admin)
    ///
    /// LONG increases exposure. SHORT locks `amount * coverage_ratio / 100`
    /// of collateral and decreases exposure; reducing exposure below zero
    /// aborts with an arithmetic error and commits nothing.
    pub fn add_position(
        &mut self,
        auth: &AuthContext,
        id: &PartyId,
        amount: i64,
        direction: Direction,
    ) -> Result<()> {
        auth.require_admin()?;
        if amount <= 0 {
            return Err(Error::Validation(format!(
                "position amount must be positive, got {}",
                amount
            )));
        }
        let coverage_pct = self.config.coverage_ratio_pct;
        let party = self.registry.require_active_mut(id)?;

        let collateral_required = match direction {
            Direction::Long => 0,
            Direction::Short => {
                let required = amount
                    .checked_mul(coverage_pct)
                    .map(|scaled| scaled / 100)
                    .ok_or_else(|| {
                        Error::Arithmetic(format!(
                            "collateral requirement overflow for amount {}",
                            amount
                        ))
                    })?;
                if party.collateral < required {
                    return Err(Error::Validation(format!(
                        "insufficient collateral: required {}, available {}",
                        required, party.collateral
                    )));
                }
                if amount > party.current_exposure {
                    return Err(Error::Arithmetic(format!(
                        "exposure underflow: reducing {} by {}",
                        party.current_exposure, amount
                    )));
                }
                required
            }
        };

        // All checks passed; commit
        match direction {
            Direction::Long => party.current_exposure += amount,
            Direction::Short => {
                party.collateral -= collateral_required;
                party.current_exposure -= amount;
            }
        }
        party.position_history.push(Position {
            amount,
            direction,
            collateral_required,
            timestamp: chrono::Utc::now(),
        });

        self.audit.append(AuditEvent::PositionAdded {
            id: id.clone(),
            amount,
            direction,
            collateral_required,
        });
        self.run_enforcer(id);
        Ok(())
    }

    // ── collateral management ───────────────────────────────────────────

    /// Deposit collateral (admin)
    pub fn deposit(&mut self, auth: &AuthContext, id: &PartyId, amount: i64) -> Result<()> {
        auth.require_admin()?;
        if amount <= 0 {
            return Err(Error::Validation(format!(
                "deposit amount must be positive, got {}",
                amount
            )));
        }
        let party = self.registry.require_active_mut(id)?;
        party.collateral += amount;
        let collateral = party.collateral;
        self.audit.append(AuditEvent::CollateralUpdated {
            id: id.clone(),
            collateral,
        });
        self.run_enforcer(id);
        Ok(())
    }

    /// Withdraw collateral (admin); gated on a coverage ratio of at least
    /// 150% whenever there is open exposure. The balance floors at zero.
    pub fn withdraw(&mut self, auth: &AuthContext, id: &PartyId, amount: i64) -> Result<()> {
        auth.require_admin()?;
        if amount <= 0 {
            return Err(Error::Validation(format!(
                "withdrawal amount must be positive, got {}",
                amount
            )));
        }
        let party = self.registry.require_active_mut(id)?;
        if party.current_exposure > 0 {
            let ratio = party.collateral * 100 / party.current_exposure;
            if ratio < 150 {
                return Err(Error::Validation(format!(
                    "coverage too low for withdrawal: {} percent",
                    ratio
                )));
            }
        }
        party.collateral = (party.collateral - amount).max(0);
        let collateral = party.collateral;
        self.audit.append(AuditEvent::CollateralUpdated {
            id: id.clone(),
            collateral,
        });
        self.run_enforcer(id);
        Ok(())
    }

    /// Set the secondary guarantee figure (admin)
    pub fn update_guarantee(
        &mut self,
        auth: &AuthContext,
        id: &PartyId,
        new_guarantee: i64,
    ) -> Result<()> {
        auth.require_admin()?;
        if new_guarantee <= 0 {
            return Err(Error::Validation(format!(
                "guarantee must be positive, got {}",
                new_guarantee
            )));
        }
        let party = self.registry.require_active_mut(id)?;
        party.guarantee = new_guarantee;
        self.audit.append(AuditEvent::GuaranteeUpdated {
            id: id.clone(),
            guarantee: new_guarantee,
        });
        self.run_enforcer(id);
        Ok(())
    }

    // ── configuration ───────────────────────────────────────────────────

    /// Reconfigure the SHORT collateralization ratio (admin); must stay
    /// above 100%
    pub fn set_coverage_ratio(&mut self, auth: &AuthContext, pct: i64) -> Result<()> {
        auth.require_admin()?;
        EngineConfig::validate_coverage_ratio(pct)?;
        self.config.coverage_ratio_pct = pct;
        self.audit.append(AuditEvent::CoverageRatioUpdated {
            coverage_ratio_pct: pct,
        });
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── bilateral transactions ──────────────────────────────────────────

    /// Record a directed value transfer between two active counterparties
    /// (admin or either party)
    pub fn record_transaction(
        &mut self,
        auth: &AuthContext,
        sender: &PartyId,
        receiver: &PartyId,
        value: i64,
    ) -> Result<()> {
        auth.require_party(sender, receiver)?;
        if receiver.is_null() {
            return Err(Error::Validation("receiver is the null identity".into()));
        }
        if value == 0 {
            return Err(Error::Validation("transaction value must be non-zero".into()));
        }
        self.registry.require_active(sender)?;
        self.registry.require_active(receiver)?;
        self.commit_transaction(sender, receiver, value);
        Ok(())
    }

    /// Move funds through the external primitive, then record the transfer
    /// (admin or either party)
    ///
    /// Check-effects-interactions: everything is validated before the
    /// external call, and the ledger entry commits only once the external
    /// move has succeeded. A failed external call commits nothing.
    pub fn send_funds(
        &mut self,
        auth: &AuthContext,
        mover: &mut dyn ValueMover,
        sender: &PartyId,
        receiver: &PartyId,
        amount: i64,
    ) -> Result<()> {
        auth.require_party(sender, receiver)?;
        if receiver.is_null() {
            return Err(Error::Validation("receiver is the null identity".into()));
        }
        if amount <= 0 {
            return Err(Error::Validation(format!(
                "transfer amount must be positive, got {}",
                amount
            )));
        }
        self.registry.require_active(sender)?;
        self.registry.require_active(receiver)?;

        mover.transfer(sender, receiver, amount)?;

        self.commit_transaction(sender, receiver, amount);
        self.audit.append(AuditEvent::FundsSent {
            sender: sender.clone(),
            receiver: receiver.clone(),
            amount,
        });
        Ok(())
    }

    /// Preconditions hold; fold into the matrix, append to the log, then
    /// enforce sender and receiver in that order
    fn commit_transaction(&mut self, sender: &PartyId, receiver: &PartyId, value: i64) {
        self.ledger.record(sender.clone(), receiver.clone(), value);
        self.audit.append(AuditEvent::OperationRecorded {
            sender: sender.clone(),
            receiver: receiver.clone(),
            value,
        });
        self.run_enforcer(sender);
        self.run_enforcer(receiver);
    }

    fn run_enforcer(&mut self, id: &PartyId) {
        let RiskEngine {
            registry, audit, ..
        } = self;
        if let Ok(party) = registry.get_mut(id) {
            enforcer::enforce(party, audit);
        }
    }

    // ── read-only queries ───────────────────────────────────────────────

    pub fn counterparty(&self, id: &PartyId) -> Result<&Counterparty> {
        self.registry.get(id)
    }

    pub fn is_active(&self, id: &PartyId) -> Result<bool> {
        Ok(self.registry.get(id)?.active)
    }

    pub fn coverage_ratio(&self, id: &PartyId) -> Result<i64> {
        metrics::coverage_ratio(self.registry.get(id)?)
    }

    pub fn risk_score(&self, id: &PartyId) -> Result<i64> {
        metrics::risk_score(self.registry.get(id)?)
    }

    pub fn guarantee_ratio(&self, id: &PartyId) -> Result<i64> {
        Ok(metrics::guarantee_ratio(self.registry.get(id)?))
    }

    pub fn expected_loss(&self, id: &PartyId, pd: i64, lgd: i64) -> Result<i64> {
        metrics::expected_loss(self.registry.get(id)?, pd, lgd)
    }

    pub fn net_exposure(&self, id: &PartyId) -> Result<i64> {
        Ok(metrics::net_exposure(self.registry.get(id)?))
    }

    pub fn penalties(&self, id: &PartyId) -> Result<i64> {
        Ok(self.registry.get(id)?.penalties)
    }

    /// The global transaction log in recording order
    pub fn transaction_history(&self) -> &[TransactionRecord] {
        self.ledger.log()
    }

    /// Log entries involving the given party
    pub fn transactions_for(&self, id: &PartyId) -> Vec<&TransactionRecord> {
        self.ledger.for_party(id).collect()
    }

    /// Signed running sum of transfers from `sender` to `receiver`
    pub fn bilateral_exposure(&self, sender: &PartyId, receiver: &PartyId) -> i64 {
        self.ledger.bilateral(sender, receiver)
    }

    pub fn audit_records(&self) -> &[AuditRecord] {
        self.audit.records()
    }

    /// Audit records strictly after the given sequence number
    pub fn audit_since(&self, seq: u64) -> &[AuditRecord] {
        self.audit.since(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::{CashAccounts, FailingMover};

    const ADMIN: AuthContext = AuthContext::Admin;

    fn engine_with(parties: &[(&str, u32, i64, i64)]) -> RiskEngine {
        let mut engine = RiskEngine::new(EngineConfig::default());
        for (id, score, limit, collateral) in parties {
            engine
                .register(&ADMIN, PartyId::from(*id), *score, *limit, *collateral)
                .unwrap();
        }
        engine
    }

    fn id(s: &str) -> PartyId {
        PartyId::from(s)
    }

    // ── registration ────────────────────────────────────────────────────

    #[test]
    fn test_register_requires_admin() {
        let mut engine = RiskEngine::new(EngineConfig::default());
        let caller = AuthContext::Party(id("acme"));
        assert!(matches!(
            engine.register(&caller, id("acme"), 70, 1_000, 0),
            Err(Error::Authorization(_))
        ));
        assert!(engine.counterparty(&id("acme")).is_err());
    }

    #[test]
    fn test_register_twice_is_state_error() {
        let mut engine = engine_with(&[("acme", 70, 1_000, 0)]);
        assert!(matches!(
            engine.register(&ADMIN, id("acme"), 70, 1_000, 0),
            Err(Error::State(_))
        ));
    }

    #[test]
    fn test_register_emits_counterparty_added() {
        let engine = engine_with(&[("acme", 70, 1_000, 500)]);
        let records = engine.audit_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event.name(), "CounterpartyAdded");
    }

    // ── positions ───────────────────────────────────────────────────────

    #[test]
    fn test_long_increases_exposure() {
        let mut engine = engine_with(&[("acme", 70, 10_000, 0)]);
        engine
            .add_position(&ADMIN, &id("acme"), 300, Direction::Long)
            .unwrap();
        engine
            .add_position(&ADMIN, &id("acme"), 200, Direction::Long)
            .unwrap();
        let c = engine.counterparty(&id("acme")).unwrap();
        assert_eq!(c.current_exposure, 500);
        assert_eq!(c.position_history.len(), 2);
        assert_eq!(c.position_history[0].collateral_required, 0);
    }

    #[test]
    fn test_short_locks_collateral_and_reduces_exposure() {
        let mut engine = engine_with(&[("acme", 70, 10_000, 1_000)]);
        engine
            .add_position(&ADMIN, &id("acme"), 500, Direction::Long)
            .unwrap();
        engine
            .add_position(&ADMIN, &id("acme"), 200, Direction::Short)
            .unwrap();
        let c = engine.counterparty(&id("acme")).unwrap();
        // 200 * 120 / 100 = 240 locked
        assert_eq!(c.collateral, 760);
        assert_eq!(c.current_exposure, 300);
        assert_eq!(c.position_history[1].collateral_required, 240);
    }

    #[test]
    fn test_short_underflow_aborts_with_no_state_change() {
        let mut engine = engine_with(&[("acme", 70, 10_000, 1_000)]);
        engine
            .add_position(&ADMIN, &id("acme"), 100, Direction::Long)
            .unwrap();
        let audit_before = engine.audit_records().len();
        let err = engine
            .add_position(&ADMIN, &id("acme"), 500, Direction::Short)
            .unwrap_err();
        assert!(matches!(err, Error::Arithmetic(_)));
        let c = engine.counterparty(&id("acme")).unwrap();
        assert_eq!(c.current_exposure, 100);
        assert_eq!(c.collateral, 1_000);
        assert_eq!(c.position_history.len(), 1);
        assert_eq!(engine.audit_records().len(), audit_before);
    }

    #[test]
    fn test_short_insufficient_collateral_is_validation_error() {
        let mut engine = engine_with(&[("acme", 70, 10_000, 100)]);
        engine
            .add_position(&ADMIN, &id("acme"), 500, Direction::Long)
            .unwrap();
        // 200 * 120 / 100 = 240 > 100 collateral
        let err = engine
            .add_position(&ADMIN, &id("acme"), 200, Direction::Short)
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let c = engine.counterparty(&id("acme")).unwrap();
        assert_eq!(c.collateral, 100);
        assert_eq!(c.current_exposure, 500);
    }

    #[test]
    fn test_position_rejects_non_positive_amount_and_inactive_party() {
        let mut engine = engine_with(&[("acme", 70, 1_000, 0)]);
        assert!(matches!(
            engine.add_position(&ADMIN, &id("acme"), 0, Direction::Long),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            engine.add_position(&ADMIN, &id("ghost"), 100, Direction::Long),
            Err(Error::State(_))
        ));
        engine.deactivate(&ADMIN, &id("acme")).unwrap();
        assert!(matches!(
            engine.add_position(&ADMIN, &id("acme"), 100, Direction::Long),
            Err(Error::State(_))
        ));
    }

    #[test]
    fn test_breach_deactivates_and_accrues_penalty() {
        let mut engine = engine_with(&[("acme", 70, 1_000, 5_000)]);
        engine
            .add_position(&ADMIN, &id("acme"), 1_200, Direction::Long)
            .unwrap();
        let c = engine.counterparty(&id("acme")).unwrap();
        assert!(!c.active);
        assert_eq!(c.penalties, 2_000);
        let names: Vec<&str> = engine
            .audit_records()
            .iter()
            .map(|r| r.event.name())
            .collect();
        assert!(names.contains(&"LimitExceeded"));
        assert!(names.contains(&"PenaltyApplied"));
        // The breaching call itself succeeded; the mutation stands
        assert_eq!(c.current_exposure, 1_200);
    }

    // ── collateral ──────────────────────────────────────────────────────

    #[test]
    fn test_deposit_adds_collateral_only() {
        let mut engine = engine_with(&[("acme", 70, 10_000, 100)]);
        engine
            .add_position(&ADMIN, &id("acme"), 400, Direction::Long)
            .unwrap();
        engine.deposit(&ADMIN, &id("acme"), 500).unwrap();
        let c = engine.counterparty(&id("acme")).unwrap();
        assert_eq!(c.collateral, 600);
        assert_eq!(c.current_exposure, 400);
    }

    #[test]
    fn test_withdraw_gated_on_coverage() {
        let mut engine = engine_with(&[("acme", 70, 10_000, 1_000)]);
        engine
            .add_position(&ADMIN, &id("acme"), 800, Direction::Long)
            .unwrap();
        // Coverage 125% < 150%
        let err = engine.withdraw(&ADMIN, &id("acme"), 100).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(engine.counterparty(&id("acme")).unwrap().collateral, 1_000);

        engine.deposit(&ADMIN, &id("acme"), 500).unwrap();
        // Coverage now 187%
        engine.withdraw(&ADMIN, &id("acme"), 100).unwrap();
        assert_eq!(engine.counterparty(&id("acme")).unwrap().collateral, 1_400);
    }

    #[test]
    fn test_withdraw_floors_at_zero_when_unexposed() {
        let mut engine = engine_with(&[("acme", 70, 10_000, 300)]);
        engine.withdraw(&ADMIN, &id("acme"), 1_000).unwrap();
        assert_eq!(engine.counterparty(&id("acme")).unwrap().collateral, 0);
    }

    #[test]
    fn test_collateral_changes_run_enforcer() {
        let mut engine = engine_with(&[("acme", 70, 10_000, 1_000)]);
        engine
            .add_position(&ADMIN, &id("acme"), 500, Direction::Long)
            .unwrap();
        // Coverage 200% passes the withdrawal gate, then floors to zero
        engine.withdraw(&ADMIN, &id("acme"), 1_000).unwrap();
        let c = engine.counterparty(&id("acme")).unwrap();
        assert_eq!(c.collateral, 0);
        assert!(c.active);
        let names: Vec<&str> = engine
            .audit_records()
            .iter()
            .map(|r| r.event.name())
            .collect();
        assert!(names.contains(&"InsufficientCoverage"));

        // A deposit that still leaves coverage at 20% re-raises the alert
        let before = engine.audit_records().len();
        engine.deposit(&ADMIN, &id("acme"), 100).unwrap();
        let after: Vec<&str> = engine.audit_records()[before..]
            .iter()
            .map(|r| r.event.name())
            .collect();
        assert_eq!(after[0], "CollateralUpdated");
        assert!(after.contains(&"InsufficientCoverage"));
    }

    #[test]
    fn test_short_collateral_requirement_overflow_aborts() {
        let mut engine = engine_with(&[("acme", 70, i64::MAX, 1_000)]);
        engine
            .add_position(&ADMIN, &id("acme"), 100, Direction::Long)
            .unwrap();
        // amount * coverage_ratio_pct exceeds i64::MAX
        let err = engine
            .add_position(&ADMIN, &id("acme"), i64::MAX / 2, Direction::Short)
            .unwrap_err();
        assert!(matches!(err, Error::Arithmetic(_)));
        let c = engine.counterparty(&id("acme")).unwrap();
        assert_eq!(c.current_exposure, 100);
        assert_eq!(c.collateral, 1_000);
        assert_eq!(c.position_history.len(), 1);
    }

    #[test]
    fn test_update_guarantee_validates_and_enforces() {
        let mut engine = engine_with(&[("acme", 70, 10_000, 2_000)]);
        assert!(matches!(
            engine.update_guarantee(&ADMIN, &id("acme"), 0),
            Err(Error::Validation(_))
        ));
        engine
            .add_position(&ADMIN, &id("acme"), 1_000, Direction::Long)
            .unwrap();
        engine.update_guarantee(&ADMIN, &id("acme"), 300).unwrap();
        // Guarantee ratio 30% < 50% raises the high-risk alert
        let names: Vec<&str> = engine
            .audit_records()
            .iter()
            .map(|r| r.event.name())
            .collect();
        assert!(names.contains(&"GuaranteeUpdated"));
        assert!(names.contains(&"InsufficientGuarantee"));
    }

    // ── configuration ───────────────────────────────────────────────────

    #[test]
    fn test_set_coverage_ratio_applies_to_new_shorts() {
        let mut engine = engine_with(&[("acme", 70, 10_000, 1_000)]);
        engine.set_coverage_ratio(&ADMIN, 200).unwrap();
        engine
            .add_position(&ADMIN, &id("acme"), 500, Direction::Long)
            .unwrap();
        engine
            .add_position(&ADMIN, &id("acme"), 100, Direction::Short)
            .unwrap();
        // 100 * 200 / 100 = 200 locked
        assert_eq!(engine.counterparty(&id("acme")).unwrap().collateral, 800);
        assert!(matches!(
            engine.set_coverage_ratio(&ADMIN, 100),
            Err(Error::Validation(_))
        ));
        assert_eq!(engine.config().coverage_ratio_pct, 200);
    }

    // ── transactions ────────────────────────────────────────────────────

    #[test]
    fn test_record_transaction_matrix_and_log() {
        let mut engine = engine_with(&[("a", 70, 10_000, 0), ("b", 70, 10_000, 0)]);
        engine
            .record_transaction(&ADMIN, &id("a"), &id("b"), 500)
            .unwrap();
        engine
            .record_transaction(&ADMIN, &id("b"), &id("a"), 500)
            .unwrap();
        // Directional entries do not net
        assert_eq!(engine.bilateral_exposure(&id("a"), &id("b")), 500);
        assert_eq!(engine.bilateral_exposure(&id("b"), &id("a")), 500);
        let log = engine.transaction_history();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sender, id("a"));
        assert_eq!(log[1].sender, id("b"));
    }

    #[test]
    fn test_record_transaction_party_capability() {
        let mut engine = engine_with(&[("a", 70, 10_000, 0), ("b", 70, 10_000, 0)]);
        let as_a = AuthContext::Party(id("a"));
        let as_c = AuthContext::Party(id("c"));
        engine
            .record_transaction(&as_a, &id("a"), &id("b"), 100)
            .unwrap();
        assert!(matches!(
            engine.record_transaction(&as_c, &id("a"), &id("b"), 100),
            Err(Error::Authorization(_))
        ));
    }

    #[test]
    fn test_record_transaction_validations() {
        let mut engine = engine_with(&[("a", 70, 10_000, 0), ("b", 70, 10_000, 0)]);
        assert!(matches!(
            engine.record_transaction(&ADMIN, &id("a"), &PartyId::null(), 100),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            engine.record_transaction(&ADMIN, &id("a"), &id("b"), 0),
            Err(Error::Validation(_))
        ));
        engine.deactivate(&ADMIN, &id("b")).unwrap();
        assert!(matches!(
            engine.record_transaction(&ADMIN, &id("a"), &id("b"), 100),
            Err(Error::State(_))
        ));
        assert!(engine.transaction_history().is_empty());
    }

    // ── funds transfer ──────────────────────────────────────────────────

    #[test]
    fn test_send_funds_records_and_emits() {
        let mut engine = engine_with(&[("a", 70, 10_000, 0), ("b", 70, 10_000, 0)]);
        let mut cash = CashAccounts::new();
        cash.fund(id("a"), 1_000);
        engine
            .send_funds(&ADMIN, &mut cash, &id("a"), &id("b"), 400)
            .unwrap();
        assert_eq!(cash.balance(&id("b")), 400);
        assert_eq!(engine.bilateral_exposure(&id("a"), &id("b")), 400);
        assert_eq!(engine.transaction_history().len(), 1);
        let names: Vec<&str> = engine
            .audit_records()
            .iter()
            .map(|r| r.event.name())
            .collect();
        let recorded = names.iter().position(|n| *n == "OperationRecorded").unwrap();
        let sent = names.iter().position(|n| *n == "FundsSent").unwrap();
        assert!(recorded < sent);
    }

    #[test]
    fn test_send_funds_external_failure_commits_nothing() {
        let mut engine = engine_with(&[("a", 70, 10_000, 0), ("b", 70, 10_000, 0)]);
        let audit_before = engine.audit_records().len();
        let err = engine
            .send_funds(&ADMIN, &mut FailingMover, &id("a"), &id("b"), 400)
            .unwrap_err();
        assert!(matches!(err, Error::Transfer(_)));
        assert!(engine.transaction_history().is_empty());
        assert_eq!(engine.bilateral_exposure(&id("a"), &id("b")), 0);
        assert_eq!(engine.audit_records().len(), audit_before);
    }

    // ── queries ─────────────────────────────────────────────────────────

    #[test]
    fn test_metric_queries_against_snapshot() {
        let mut engine = engine_with(&[("acme", 50, 1_000, 900)]);
        engine
            .add_position(&ADMIN, &id("acme"), 600, Direction::Long)
            .unwrap();
        assert_eq!(engine.coverage_ratio(&id("acme")).unwrap(), 150);
        assert_eq!(engine.risk_score(&id("acme")).unwrap(), 120);
        assert_eq!(engine.guarantee_ratio(&id("acme")).unwrap(), 0);
        assert_eq!(engine.expected_loss(&id("acme"), 10, 50).unwrap(), 30);
        assert_eq!(engine.net_exposure(&id("acme")).unwrap(), 600);
        assert_eq!(engine.penalties(&id("acme")).unwrap(), 0);
        assert!(engine.is_active(&id("acme")).unwrap());
    }

    #[test]
    fn test_transactions_for_filters_by_party() {
        let mut engine = engine_with(&[
            ("a", 70, 10_000, 0),
            ("b", 70, 10_000, 0),
            ("c", 70, 10_000, 0),
        ]);
        engine
            .record_transaction(&ADMIN, &id("a"), &id("b"), 100)
            .unwrap();
        engine
            .record_transaction(&ADMIN, &id("b"), &id("c"), 200)
            .unwrap();
        let for_a = engine.transactions_for(&id("a"));
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].receiver, id("b"));
        assert_eq!(engine.transactions_for(&id("b")).len(), 2);
        assert!(engine.transactions_for(&id("ghost")).is_empty());
    }

    #[test]
    fn test_audit_stream_is_totally_ordered() {
        let mut engine = engine_with(&[("a", 70, 10_000, 0), ("b", 70, 10_000, 0)]);
        engine
            .record_transaction(&ADMIN, &id("a"), &id("b"), 250)
            .unwrap();
        let seqs: Vec<u64> = engine.audit_records().iter().map(|r| r.seq).collect();
        let mut sorted = seqs.clone();
        sorted.sort_unstable();
        assert_eq!(seqs, sorted);
        assert_eq!(engine.audit_since(seqs[0]).len(), seqs.len() - 1);
    }
}
