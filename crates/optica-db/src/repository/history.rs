//! # Spend History Repository
//!
//! Read-side access to the ground-truth spend records (purchase totals
//! and prescription net amounts) the recalculation engine replays. The
//! rows are owned by the sales modules; `record` exists for them (and
//! for tests) to land data, nothing here ever updates or deletes.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use optica_core::money::Money;
use optica_core::recalc::RecalcWindow;
use optica_core::types::{SpendKind, SpendRecord};

/// Repository for ground-truth spend history.
#[derive(Debug, Clone)]
pub struct SpendHistoryRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SpendRow {
    id: String,
    customer_id: String,
    event_date: NaiveDate,
    kind: String,
    amount_cents: i64,
}

impl SpendRow {
    fn into_record(self) -> DbResult<SpendRecord> {
        let kind = SpendKind::parse(&self.kind)
            .ok_or_else(|| DbError::Internal(format!("unknown spend kind: {}", self.kind)))?;
        Ok(SpendRecord {
            id: self.id,
            customer_id: self.customer_id,
            event_date: self.event_date,
            kind,
            amount: Money::from_cents(self.amount_cents),
        })
    }
}

impl SpendHistoryRepository {
    /// Creates a new SpendHistoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SpendHistoryRepository { pool }
    }

    /// Records one spend event (called by the sales modules).
    pub async fn record(&self, record: &SpendRecord) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO spend_records (id, customer_id, event_date, kind, amount_cents)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&record.id)
        .bind(&record.customer_id)
        .bind(record.event_date)
        .bind(record.kind.as_str())
        .bind(record.amount.cents())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All spend records inside an optional date window.
    ///
    /// The window filter is also applied by the pure planner; pushing it
    /// into SQL just keeps the snapshot small.
    pub async fn in_window(&self, window: &RecalcWindow) -> DbResult<Vec<SpendRecord>> {
        let mut sql = String::from(
            "SELECT id, customer_id, event_date, kind, amount_cents FROM spend_records WHERE 1=1",
        );
        if window.start.is_some() {
            sql.push_str(" AND event_date >= ?");
        }
        if window.end.is_some() {
            sql.push_str(" AND event_date <= ?");
        }
        sql.push_str(" ORDER BY event_date");

        let mut query = sqlx::query_as::<_, SpendRow>(&sql);
        if let Some(start) = window.start {
            query = query.bind(start);
        }
        if let Some(end) = window.end {
            query = query.bind(end);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(SpendRow::into_record).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
