//! Riskdesk Engine - Counterparty exposure tracking and limit enforcement
//!
//! The engine is a small state machine over registered counterparties:
//! positions and bilateral transfers move exposure, collateral and
//! guarantees back it, and the limit enforcer reacts to every
//! exposure-affecting mutation with penalties, deactivation, and risk
//! alerts. Execution is strictly serial: one operation runs to completion,
//! fully committed or fully aborted, before the next begins.

pub mod audit;
pub mod auth;
pub mod config;
pub mod enforcer;
pub mod engine;
pub mod ledger;
pub mod metrics;
pub mod registry;
pub mod service;
pub mod transfer;

pub use audit::AuditLog;
pub use auth::AuthContext;
pub use config::EngineConfig;
pub use engine::RiskEngine;
pub use registry::CounterpartyRegistry;
pub use service::{EngineService, SpawnedEngine};
pub use transfer::{CashAccounts, ValueMover};
