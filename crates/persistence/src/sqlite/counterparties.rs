//! Counterparty snapshot persistence

use riskdesk_core::{Counterparty, Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Counterparty snapshot stored in database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CounterpartyRow {
    pub id: String,
    pub credit_score: i64,
    pub exposure_limit: i64,
    pub current_exposure: i64,
    pub collateral: i64,
    pub guarantee: i64,
    pub penalties: i64,
    pub active: i64,
}

/// Write the latest snapshot of a counterparty
pub async fn upsert_counterparty(pool: &SqlitePool, party: &Counterparty) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO counterparties
            (id, credit_score, exposure_limit, current_exposure, collateral, guarantee, penalties, active)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            credit_score = excluded.credit_score,
            exposure_limit = excluded.exposure_limit,
            current_exposure = excluded.current_exposure,
            collateral = excluded.collateral,
            guarantee = excluded.guarantee,
            penalties = excluded.penalties,
            active = excluded.active
        "#,
    )
    .bind(party.id.as_str())
    .bind(party.credit_score as i64)
    .bind(party.exposure_limit)
    .bind(party.current_exposure)
    .bind(party.collateral)
    .bind(party.guarantee)
    .bind(party.penalties)
    .bind(party.active as i64)
    .execute(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    Ok(())
}

/// Fetch one counterparty snapshot by id
pub async fn get_counterparty(pool: &SqlitePool, id: &str) -> Result<Option<CounterpartyRow>> {
    let row = sqlx::query_as::<_, CounterpartyRow>(
        r#"
        SELECT id, credit_score, exposure_limit, current_exposure, collateral, guarantee, penalties, active
        FROM counterparties
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    Ok(row)
}

/// Fetch all counterparty snapshots in registration order
pub async fn list_counterparties(pool: &SqlitePool) -> Result<Vec<CounterpartyRow>> {
    let rows = sqlx::query_as::<_, CounterpartyRow>(
        r#"
        SELECT id, credit_score, exposure_limit, current_exposure, collateral, guarantee, penalties, active
        FROM counterparties
        ORDER BY registered_at, id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    Ok(rows)
}
