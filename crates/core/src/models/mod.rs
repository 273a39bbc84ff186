//! Data models shared across the riskdesk crates

pub mod audit;
pub mod counterparty;
pub mod position;
pub mod transaction;

pub use audit::{AuditEvent, AuditRecord};
pub use counterparty::{Counterparty, CounterpartySummary};
pub use position::{Direction, Position};
pub use transaction::TransactionRecord;
