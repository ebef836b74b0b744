//! # Recalculation Engine
//!
//! Batch-corrects drifted point balances from the ground-truth spend
//! history.
//!
//! ## Batch Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  recalculate_all(window)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  snapshot: customers + full point history + windowed spend              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  plan_recalculation(...)  ← pure, in optica-core                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    for each correction:                                                 │
//! │      UPDATE customers SET points = new_balance                          │
//! │      INSERT corrective adjust transaction (diff, dated now)             │
//! │  COMMIT ← every customer or none                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The snapshot reads and the batch write are separate transactions; a
//! sale landing between them just means the next run picks it up.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, LedgerResult};
use crate::repository::audit::AuditLogRepository;
use crate::repository::history::SpendHistoryRepository;
use crate::repository::points::PointRepository;
use optica_core::recalc::{plan_recalculation, BalanceCorrection, RecalcWindow, RECALC_RUN_PREFIX};
use optica_core::types::{AuditAction, PointTransaction, PointTransactionType};
use optica_core::validation::validate_earn_rate;
use optica_core::CoreError;

const AUDIT_MODULE: &str = "loyalty";

/// The point recalculation service.
#[derive(Debug, Clone)]
pub struct RecalculationEngine {
    pool: SqlitePool,
    points: PointRepository,
    spend: SpendHistoryRepository,
    audit: AuditLogRepository,
    /// Whole currency units of spend per point.
    earn_rate: i64,
}

impl RecalculationEngine {
    /// Creates an engine with the given earn rate.
    pub fn new(pool: SqlitePool, earn_rate: i64) -> Self {
        RecalculationEngine {
            points: PointRepository::new(pool.clone()),
            spend: SpendHistoryRepository::new(pool.clone()),
            audit: AuditLogRepository::new(pool.clone()),
            pool,
            earn_rate,
        }
    }

    /// Recalculates every customer's balance against the spend history in
    /// `window` and commits all corrections in one transaction.
    ///
    /// ## Returns
    /// The number of customers corrected. Zero means all balances were
    /// already in sync.
    pub async fn recalculate_all(&self, window: &RecalcWindow, actor: &str) -> LedgerResult<u32> {
        validate_earn_rate(self.earn_rate).map_err(CoreError::from)?;

        let customers = self.points.list_customers().await?;
        let transactions = self.points.all_transactions().await?;
        let spend = self.spend.in_window(window).await?;

        let plan = plan_recalculation(&customers, &transactions, &spend, self.earn_rate, window);
        if plan.is_empty() {
            info!(customers = customers.len(), "Recalculation: all balances in sync");
            return Ok(0);
        }

        // The prefix marks corrections so later replays skip them
        let run_id = format!("{RECALC_RUN_PREFIX}{}", Uuid::new_v4());
        self.apply_plan(&plan, &run_id).await?;

        info!(
            run_id = %run_id,
            corrected = plan.len(),
            customers = customers.len(),
            earn_rate = self.earn_rate,
            "Recalculation committed"
        );
        self.audit_run(&plan, &run_id, actor).await;

        Ok(plan.len() as u32)
    }

    /// Writes every correction in a single transaction.
    async fn apply_plan(&self, plan: &[BalanceCorrection], run_id: &str) -> LedgerResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        for correction in plan {
            self.points
                .set_balance(&mut *tx, &correction.customer_id, correction.new_balance)
                .await?;

            let record = PointTransaction {
                id: Uuid::new_v4().to_string(),
                customer_id: correction.customer_id.clone(),
                tx_date: Utc::now(),
                tx_type: PointTransactionType::Adjust,
                points: correction.diff,
                related_id: Some(run_id.to_string()),
                note: Some(format!(
                    "Recalculation correction: {} -> {}",
                    correction.previous, correction.new_balance
                )),
            };
            self.points.insert_transaction(&mut *tx, &record).await?;
        }

        tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn audit_run(&self, plan: &[BalanceCorrection], run_id: &str, actor: &str) {
        let after = serde_json::to_value(plan).ok();
        if let Err(err) = self
            .audit
            .record(
                AuditAction::Update,
                AUDIT_MODULE,
                &format!("Point recalculation corrected {} customer(s)", plan.len()),
                Some(run_id),
                None,
                after,
                actor,
            )
            .await
        {
            warn!(run_id = %run_id, error = %err, "Audit record failed");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
