//! Audit stream persistence (append-only)

use riskdesk_core::{AuditRecord, Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Audit entry stored in database; `details` holds the serialized event
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditRow {
    pub seq: i64,
    pub event: String,
    pub details: String,
    pub created_at: Option<String>,
}

/// Append one audit record, keyed by its engine-assigned sequence number
pub async fn append_audit(pool: &SqlitePool, record: &AuditRecord) -> Result<()> {
    let details = serde_json::to_string(&record.event)?;
    sqlx::query(
        r#"
        INSERT INTO audit_log (seq, event, details, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(record.seq as i64)
    .bind(record.event.name())
    .bind(details)
    .bind(record.timestamp.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    Ok(())
}

/// Fetch audit records with seq strictly greater than the cursor
pub async fn get_audit_records(pool: &SqlitePool, after_seq: i64, limit: u32) -> Result<Vec<AuditRow>> {
    let rows = sqlx::query_as::<_, AuditRow>(
        r#"
        SELECT seq, event, details, created_at
        FROM audit_log
        WHERE seq > ?
        ORDER BY seq
        LIMIT ?
        "#,
    )
    .bind(after_seq)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    Ok(rows)
}

/// Total number of persisted audit records
pub async fn count_audit_records(pool: &SqlitePool) -> Result<u32> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_log")
        .fetch_one(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    Ok(row.0 as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use riskdesk_core::{AuditEvent, PartyId};

    #[tokio::test]
    async fn test_audit_round_trips_event_payload() {
        let db = Database::connect_in_memory().await.unwrap();
        let record = AuditRecord {
            seq: 1,
            timestamp: chrono::Utc::now(),
            event: AuditEvent::PenaltyApplied {
                id: PartyId::from("acme"),
                penalty: 2_000,
                total_penalties: 2_000,
            },
        };
        append_audit(db.pool(), &record).await.unwrap();
        assert_eq!(count_audit_records(db.pool()).await.unwrap(), 1);
        let rows = get_audit_records(db.pool(), 0, 10).await.unwrap();
        assert_eq!(rows[0].event, "PenaltyApplied");
        let parsed: AuditEvent = serde_json::from_str(&rows[0].details).unwrap();
        assert_eq!(parsed, record.event);
        assert!(get_audit_records(db.pool(), 1, 10).await.unwrap().is_empty());
    }
}
