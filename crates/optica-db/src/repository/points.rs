//! # Point Repository
//!
//! Loyalty balances and the append-only point history.
//!
//! ## Write Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  customers.points is a DENORMALIZED running balance.                    │
//! │                                                                         │
//! │  Every balance write is a RELATIVE update:                              │
//! │      UPDATE customers SET points = points + ?delta                      │
//! │  executed inside the same transaction as the history row, so two       │
//! │  racing adjustments can never lose an update.                           │
//! │                                                                         │
//! │  Absolute writes (SET points = ?) happen only inside the               │
//! │  recalculation batch, which owns the whole balance anyway.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mutating methods take a generic executor so services can run them
//! inside their own transactions.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use optica_core::types::{CustomerBalance, PointTransaction, PointTransactionType};

/// Repository for loyalty point operations.
#[derive(Debug, Clone)]
pub struct PointRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: String,
    name: String,
    points: i64,
}

impl From<CustomerRow> for CustomerBalance {
    fn from(row: CustomerRow) -> Self {
        CustomerBalance {
            customer_id: row.id,
            name: row.name,
            points: row.points,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PointTransactionRow {
    id: String,
    customer_id: String,
    tx_date: DateTime<Utc>,
    tx_type: String,
    points: i64,
    related_id: Option<String>,
    note: Option<String>,
}

impl PointTransactionRow {
    fn into_transaction(self) -> DbResult<PointTransaction> {
        let tx_type = PointTransactionType::parse(&self.tx_type).ok_or_else(|| {
            DbError::Internal(format!("unknown point transaction type: {}", self.tx_type))
        })?;
        Ok(PointTransaction {
            id: self.id,
            customer_id: self.customer_id,
            tx_date: self.tx_date,
            tx_type,
            points: self.points,
            related_id: self.related_id,
            note: self.note,
        })
    }
}

impl PointRepository {
    /// Creates a new PointRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PointRepository { pool }
    }

    /// Creates the balance row for a customer if it doesn't exist yet.
    ///
    /// Customer CRUD itself lives outside this core; this exists so the
    /// sales modules (and tests) can guarantee the row before adjusting.
    pub async fn ensure_customer(&self, customer_id: &str, name: &str) -> DbResult<()> {
        sqlx::query("INSERT OR IGNORE INTO customers (id, name, points) VALUES (?1, ?2, 0)")
            .bind(customer_id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Gets one customer's balance row.
    pub async fn get_balance(&self, customer_id: &str) -> DbResult<Option<CustomerBalance>> {
        let row: Option<CustomerRow> =
            sqlx::query_as("SELECT id, name, points FROM customers WHERE id = ?1")
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(CustomerBalance::from))
    }

    /// Every customer's balance row (the recalculation snapshot).
    pub async fn list_customers(&self) -> DbResult<Vec<CustomerBalance>> {
        let rows: Vec<CustomerRow> =
            sqlx::query_as("SELECT id, name, points FROM customers ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(CustomerBalance::from).collect())
    }

    /// Applies a relative delta to a customer's balance.
    ///
    /// ## Returns
    /// Number of rows touched: 0 means the customer doesn't exist.
    pub async fn apply_balance_delta<'e, E>(
        &self,
        executor: E,
        customer_id: &str,
        delta: i64,
    ) -> DbResult<u64>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        debug!(customer_id = %customer_id, delta, "Applying balance delta");

        let result = sqlx::query("UPDATE customers SET points = points + ?2 WHERE id = ?1")
            .bind(customer_id)
            .bind(delta)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Overwrites a customer's balance (recalculation batch only).
    pub async fn set_balance<'e, E>(
        &self,
        executor: E,
        customer_id: &str,
        points: i64,
    ) -> DbResult<u64>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query("UPDATE customers SET points = ?2 WHERE id = ?1")
            .bind(customer_id)
            .bind(points)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Appends one point transaction (history rows are never edited).
    pub async fn insert_transaction<'e, E>(
        &self,
        executor: E,
        tx: &PointTransaction,
    ) -> DbResult<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO point_transactions (
                id, customer_id, tx_date, tx_type, points, related_id, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&tx.id)
        .bind(&tx.customer_id)
        .bind(tx.tx_date)
        .bind(tx.tx_type.as_str())
        .bind(tx.points)
        .bind(&tx.related_id)
        .bind(&tx.note)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// One customer's history, oldest first.
    pub async fn transactions_for_customer(
        &self,
        customer_id: &str,
    ) -> DbResult<Vec<PointTransaction>> {
        let rows: Vec<PointTransactionRow> = sqlx::query_as(
            r#"
            SELECT id, customer_id, tx_date, tx_type, points, related_id, note
            FROM point_transactions
            WHERE customer_id = ?1
            ORDER BY tx_date
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(PointTransactionRow::into_transaction)
            .collect()
    }

    /// The complete point history (the recalculation snapshot).
    pub async fn all_transactions(&self) -> DbResult<Vec<PointTransaction>> {
        let rows: Vec<PointTransactionRow> = sqlx::query_as(
            r#"
            SELECT id, customer_id, tx_date, tx_type, points, related_id, note
            FROM point_transactions
            ORDER BY tx_date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(PointTransactionRow::into_transaction)
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use uuid::Uuid;

    fn tx(customer_id: &str, tx_type: PointTransactionType, points: i64) -> PointTransaction {
        PointTransaction {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            tx_date: Utc::now(),
            tx_type,
            points,
            related_id: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_ensure_customer_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.points();

        repo.ensure_customer("c1", "Ada").await.unwrap();
        repo.ensure_customer("c1", "Ada renamed").await.unwrap();

        let balance = repo.get_balance("c1").await.unwrap().unwrap();
        assert_eq!(balance.name, "Ada"); // second call ignored
        assert_eq!(balance.points, 0);
    }

    #[tokio::test]
    async fn test_delta_and_history() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.points();
        repo.ensure_customer("c1", "Ada").await.unwrap();

        let touched = repo.apply_balance_delta(db.pool(), "c1", 40).await.unwrap();
        assert_eq!(touched, 1);
        repo.insert_transaction(db.pool(), &tx("c1", PointTransactionType::Earn, 40))
            .await
            .unwrap();

        let touched = repo
            .apply_balance_delta(db.pool(), "c1", -10)
            .await
            .unwrap();
        assert_eq!(touched, 1);
        repo.insert_transaction(db.pool(), &tx("c1", PointTransactionType::Redeem, -10))
            .await
            .unwrap();

        assert_eq!(repo.get_balance("c1").await.unwrap().unwrap().points, 30);
        let history = repo.transactions_for_customer("c1").await.unwrap();
        assert_eq!(history.len(), 2);

        // Unknown customer touches nothing
        let touched = repo
            .apply_balance_delta(db.pool(), "ghost", 5)
            .await
            .unwrap();
        assert_eq!(touched, 0);
    }

    #[tokio::test]
    async fn test_transaction_requires_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.points();

        let err = repo
            .insert_transaction(db.pool(), &tx("ghost", PointTransactionType::Adjust, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
