//! Global transaction ledger persistence (append-only)

use riskdesk_core::{Error, Result, TransactionRecord};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Ledger entry stored in database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LedgerRow {
    pub id: i64,
    pub sender_id: String,
    pub receiver_id: String,
    pub value: i64,
    pub recorded_at: Option<String>,
}

/// Append one directed transfer to the ledger table
pub async fn append_ledger_entry(pool: &SqlitePool, record: &TransactionRecord) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO ledger (sender_id, receiver_id, value, recorded_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(record.sender.as_str())
    .bind(record.receiver.as_str())
    .bind(record.value)
    .bind(record.timestamp.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    Ok(result.last_insert_rowid())
}

/// Fetch ledger entries in recording order, optionally filtered to one party
pub async fn get_ledger_entries(
    pool: &SqlitePool,
    party_id: Option<&str>,
    limit: u32,
) -> Result<Vec<LedgerRow>> {
    let rows = match party_id {
        Some(id) => {
            sqlx::query_as::<_, LedgerRow>(
                r#"
                SELECT id, sender_id, receiver_id, value, recorded_at
                FROM ledger
                WHERE sender_id = ? OR receiver_id = ?
                ORDER BY id
                LIMIT ?
                "#,
            )
            .bind(id)
            .bind(id)
            .bind(limit)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, LedgerRow>(
                r#"
                SELECT id, sender_id, receiver_id, value, recorded_at
                FROM ledger
                ORDER BY id
                LIMIT ?
                "#,
            )
            .bind(limit)
            .fetch_all(pool)
            .await
        }
    }
    .map_err(|e| Error::Database(e.to_string()))?;

    Ok(rows)
}

/// Total number of ledger entries
pub async fn count_ledger_entries(pool: &SqlitePool) -> Result<u32> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ledger")
        .fetch_one(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    Ok(row.0 as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use riskdesk_core::PartyId;

    #[tokio::test]
    async fn test_ledger_appends_in_order() {
        let db = Database::connect_in_memory().await.unwrap();
        let now = chrono::Utc::now();
        for value in [500, -200] {
            append_ledger_entry(
                db.pool(),
                &TransactionRecord {
                    sender: PartyId::from("a"),
                    receiver: PartyId::from("b"),
                    value,
                    timestamp: now,
                },
            )
            .await
            .unwrap();
        }
        assert_eq!(count_ledger_entries(db.pool()).await.unwrap(), 2);
        let rows = get_ledger_entries(db.pool(), Some("b"), 10).await.unwrap();
        assert_eq!(rows[0].value, 500);
        assert_eq!(rows[1].value, -200);
        assert!(get_ledger_entries(db.pool(), Some("c"), 10)
            .await
            .unwrap()
            .is_empty());
    }
}
