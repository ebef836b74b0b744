//! # Point Ledger Service
//!
//! Atomic loyalty-point adjustments.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  adjust(customer, delta)                                                │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE customers SET points = points + delta   ← relative, not RMW  │
//! │    INSERT INTO point_transactions (...)           ← history append     │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Balance and history move together or not at all. Two concurrent       │
//! │  adjustments serialize at the row; neither update is lost.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No Floor Check
//! Redemptions may drive a balance negative; the ledger records what it
//! is told. Over-redemption policy belongs to the selling screen, and
//! recalculation clamps at zero anyway.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, LedgerResult};
use crate::repository::points::PointRepository;
use optica_core::types::{CustomerBalance, PointTransaction, PointTransactionType};

/// The loyalty point service.
#[derive(Debug, Clone)]
pub struct PointLedger {
    pool: SqlitePool,
    points: PointRepository,
}

impl PointLedger {
    /// Creates a new PointLedger.
    pub fn new(pool: SqlitePool) -> Self {
        PointLedger {
            points: PointRepository::new(pool.clone()),
            pool,
        }
    }

    /// Applies a signed point delta and appends the matching history
    /// transaction, atomically.
    ///
    /// ## Returns
    /// The id of the appended point transaction.
    ///
    /// ## Errors
    /// [`DbError::NotFound`] when the customer has no balance row.
    pub async fn adjust(
        &self,
        customer_id: &str,
        delta: i64,
        tx_type: PointTransactionType,
        note: Option<String>,
        related_id: Option<String>,
    ) -> LedgerResult<String> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let touched = self
            .points
            .apply_balance_delta(&mut *tx, customer_id, delta)
            .await?;
        if touched == 0 {
            // Implicit rollback on drop
            return Err(DbError::not_found("Customer", customer_id).into());
        }

        let record = PointTransaction {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            tx_date: Utc::now(),
            tx_type,
            points: delta,
            related_id,
            note,
        };
        self.points.insert_transaction(&mut *tx, &record).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            customer_id = %customer_id,
            delta,
            tx_type = tx_type.as_str(),
            "Point balance adjusted"
        );
        Ok(record.id)
    }

    /// One customer's balance row.
    pub async fn balance(&self, customer_id: &str) -> LedgerResult<CustomerBalance> {
        self.points
            .get_balance(customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", customer_id).into())
    }

    /// One customer's point history, oldest first.
    pub async fn history(&self, customer_id: &str) -> LedgerResult<Vec<PointTransaction>> {
        Ok(self.points.transactions_for_customer(customer_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_adjust_moves_balance_and_history_together() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.points().ensure_customer("c1", "Ada").await.unwrap();
        let ledger = db.point_ledger();

        ledger
            .adjust("c1", 40, PointTransactionType::Earn, None, Some("sale-1".to_string()))
            .await
            .unwrap();
        ledger
            .adjust(
                "c1",
                -10,
                PointTransactionType::Redeem,
                Some("Discount on lenses".to_string()),
                None,
            )
            .await
            .unwrap();

        assert_eq!(ledger.balance("c1").await.unwrap().points, 30);

        let history = ledger.history("c1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].points, 40);
        assert_eq!(history[0].related_id.as_deref(), Some("sale-1"));
        assert_eq!(history[1].points, -10);
    }

    #[tokio::test]
    async fn test_unknown_customer_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ledger = db.point_ledger();

        let err = ledger
            .adjust("ghost", 5, PointTransactionType::Adjust, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::LedgerError::Db(DbError::NotFound { .. })
        ));

        // Nothing was appended
        assert!(db.points().all_transactions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_redemption_may_go_negative() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.points().ensure_customer("c1", "Ada").await.unwrap();
        let ledger = db.point_ledger();

        ledger
            .adjust("c1", -50, PointTransactionType::Redeem, None, None)
            .await
            .unwrap();

        assert_eq!(ledger.balance("c1").await.unwrap().points, -50);
    }
}
