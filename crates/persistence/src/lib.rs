//! Riskdesk Persistence - SQLite sinks for audit, ledger, and snapshots
//!
//! The engine's audit stream and transaction log are append-only; the
//! corresponding tables are insert-only and never updated or deleted.

pub mod sqlite;

pub use sqlite::connection::Database;
