//! SQLite persistence modules

pub mod audit;
pub mod connection;
pub mod counterparties;
pub mod positions;
pub mod transactions;

pub use audit::{append_audit, count_audit_records, get_audit_records, AuditRow};
pub use connection::Database;
pub use counterparties::{get_counterparty, list_counterparties, upsert_counterparty, CounterpartyRow};
pub use positions::{get_positions, insert_position, PositionRow};
pub use transactions::{append_ledger_entry, count_ledger_entries, get_ledger_entries, LedgerRow};
