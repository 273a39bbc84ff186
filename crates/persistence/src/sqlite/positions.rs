//! Position history persistence

use riskdesk_core::{Error, Position, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Position record stored in database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PositionRow {
    pub id: i64,
    pub party_id: String,
    pub amount: i64,
    pub direction: String,
    pub collateral_required: i64,
    pub booked_at: Option<String>,
}

/// Append one booked position for a counterparty
pub async fn insert_position(pool: &SqlitePool, party_id: &str, position: &Position) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO positions (party_id, amount, direction, collateral_required, booked_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(party_id)
    .bind(position.amount)
    .bind(position.direction.as_str())
    .bind(position.collateral_required)
    .bind(position.timestamp.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    Ok(result.last_insert_rowid())
}

/// Position history for a counterparty in booking order
pub async fn get_positions(pool: &SqlitePool, party_id: &str) -> Result<Vec<PositionRow>> {
    let rows = sqlx::query_as::<_, PositionRow>(
        r#"
        SELECT id, party_id, amount, direction, collateral_required, booked_at
        FROM positions
        WHERE party_id = ?
        ORDER BY id
        "#,
    )
    .bind(party_id)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    Ok(rows)
}
