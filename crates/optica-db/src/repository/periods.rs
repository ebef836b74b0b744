//! # Accounting Period Repository
//!
//! Month lock records. A row exists only while the period is closed:
//! closing inserts it, reopening deletes it. No history is kept.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use optica_core::types::AccountingPeriod;

/// Repository for accounting period lock records.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct PeriodRow {
    id: String,
    year: i64,
    month: i64,
    is_closed: i64,
    closed_by: String,
    closed_at: DateTime<Utc>,
}

impl From<PeriodRow> for AccountingPeriod {
    fn from(row: PeriodRow) -> Self {
        AccountingPeriod {
            id: row.id,
            year: row.year as i32,
            month: row.month as u32,
            is_closed: row.is_closed != 0,
            closed_by: row.closed_by,
            closed_at: row.closed_at,
        }
    }
}

impl PeriodRepository {
    /// Creates a new PeriodRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PeriodRepository { pool }
    }

    /// Finds the lock record for a (year, month), if any.
    pub async fn find(&self, year: i32, month: u32) -> DbResult<Option<AccountingPeriod>> {
        let row: Option<PeriodRow> = sqlx::query_as(
            r#"
            SELECT id, year, month, is_closed, closed_by, closed_at
            FROM accounting_periods
            WHERE year = ?1 AND month = ?2
            "#,
        )
        .bind(year)
        .bind(month as i64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AccountingPeriod::from))
    }

    /// Inserts a lock record.
    pub async fn insert(&self, period: &AccountingPeriod) -> DbResult<()> {
        debug!(year = period.year, month = period.month, "Inserting period lock");

        sqlx::query(
            r#"
            INSERT INTO accounting_periods (id, year, month, is_closed, closed_by, closed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&period.id)
        .bind(period.year)
        .bind(period.month as i64)
        .bind(period.is_closed as i64)
        .bind(&period.closed_by)
        .bind(period.closed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes the lock record for a (year, month).
    ///
    /// ## Returns
    /// `true` if a record was deleted, `false` if none existed.
    pub async fn delete(&self, year: i32, month: u32) -> DbResult<bool> {
        debug!(year, month, "Deleting period lock");

        let result = sqlx::query("DELETE FROM accounting_periods WHERE year = ?1 AND month = ?2")
            .bind(year)
            .bind(month as i64)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All closed periods, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<AccountingPeriod>> {
        let rows: Vec<PeriodRow> = sqlx::query_as(
            r#"
            SELECT id, year, month, is_closed, closed_by, closed_at
            FROM accounting_periods
            ORDER BY year, month
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AccountingPeriod::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
