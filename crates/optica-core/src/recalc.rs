//! # Point Recalculation Planner
//!
//! Replays spend history to reconcile denormalized point balances.
//!
//! ## Why Replay?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Point earning is DERIVED from sale amounts. Sales get edited and       │
//! │  deleted after the fact, so the earn-type history drifts from what      │
//! │  should have been earned.                                               │
//! │                                                                         │
//! │  Incrementally patching the earn stream compounds drift from partial    │
//! │  edits. Instead we recompute the target from the source of truth:       │
//! │                                                                         │
//! │    target_earned  = floor(Σ spend in range / earn_rate)                 │
//! │    non_sales      = Σ points of redeem + adjust txs (ALL history,       │
//! │                       excluding prior recalculation corrections)        │
//! │    new_balance    = max(0, target_earned + non_sales)                   │
//! │    diff           = new_balance - current denormalized balance          │
//! │                                                                         │
//! │  diff != 0 → write new balance + ONE corrective adjust transaction.     │
//! │                                                                         │
//! │  Trade-off: all drift collapses into one correction dated "now"; the    │
//! │  original temporal distribution of earn events is not reconstructed.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This module only PLANS. The storage layer loads the snapshots, calls
//! [`plan_recalculation`], and commits every correction in a single
//! all-or-nothing batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{CustomerBalance, PointTransaction, PointTransactionType, SpendRecord};

// =============================================================================
// Earn Math
// =============================================================================

/// Points earned for a spend total: `floor(spend / earn_rate)`.
///
/// The earn rate is expressed in whole currency units per point, so the
/// division runs against cents × 100. Negative spend earns nothing.
///
/// ## Example
/// ```rust
/// use optica_core::money::Money;
/// use optica_core::recalc::earned_points;
///
/// assert_eq!(earned_points(Money::from_major(1000), 25), 40);
/// assert_eq!(earned_points(Money::from_cents(101_250), 25), 40); // floor(40.5)
/// ```
pub fn earned_points(total_spend: Money, earn_rate: i64) -> i64 {
    if earn_rate <= 0 || total_spend.is_negative() {
        return 0;
    }
    total_spend.cents() / (earn_rate * 100)
}

// =============================================================================
// Correction Marker
// =============================================================================

/// `related_id` prefix stamped on corrective transactions written by a
/// recalculation run.
///
/// Corrections must be distinguishable from manual adjustments: they are
/// derived values (like earn transactions) and are excluded when the
/// next replay sums the non-sales balance. Counting them would compound
/// every past correction into the next one and break idempotence.
pub const RECALC_RUN_PREFIX: &str = "recalc:";

/// Whether a transaction is a correction written by a recalculation run.
pub fn is_recalc_correction(tx: &PointTransaction) -> bool {
    tx.related_id
        .as_deref()
        .is_some_and(|r| r.starts_with(RECALC_RUN_PREFIX))
}

// =============================================================================
// Recalculation Window
// =============================================================================

/// Optional `[start, end]` date bound on the spend replay.
///
/// Only the SPEND side is bounded. The redeem/adjust history always
/// contributes in full, since those transactions are ground truth rather
/// than derived values.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RecalcWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl RecalcWindow {
    /// Unbounded window: replay everything.
    pub fn all() -> Self {
        RecalcWindow::default()
    }

    /// Window between two optional bounds (inclusive).
    pub fn between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        RecalcWindow { start, end }
    }

    /// Whether a spend date falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// The Plan
// =============================================================================

/// One customer whose balance needs correcting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceCorrection {
    pub customer_id: String,
    /// Denormalized balance before correction.
    pub previous: i64,
    /// Recomputed balance, already clamped at zero.
    pub new_balance: i64,
    /// `new_balance - previous`; carried by the corrective transaction.
    pub diff: i64,
}

/// Computes the corrections needed to restore every customer's balance
/// invariant. Customers already in sync produce no correction, so running
/// the plan twice in a row yields an empty second plan.
///
/// ## Arguments
/// * `customers` - denormalized balance rows (every customer)
/// * `transactions` - complete point history (all customers, all time)
/// * `spend` - ground-truth purchase/prescription amounts
/// * `earn_rate` - whole currency units per point
/// * `window` - optional date bound applied to `spend` only
pub fn plan_recalculation(
    customers: &[CustomerBalance],
    transactions: &[PointTransaction],
    spend: &[SpendRecord],
    earn_rate: i64,
    window: &RecalcWindow,
) -> Vec<BalanceCorrection> {
    customers
        .iter()
        .filter_map(|customer| {
            let total_spend: Money = spend
                .iter()
                .filter(|s| s.customer_id == customer.customer_id && window.contains(s.event_date))
                .map(|s| s.amount)
                .sum();

            let target_earned = earned_points(total_spend, earn_rate);

            // Earn transactions are excluded on purpose: they are the very
            // values being recomputed wholesale from spend. Corrections
            // written by earlier recalculation runs are excluded for the
            // same reason.
            let non_sales_balance: i64 = transactions
                .iter()
                .filter(|t| {
                    t.customer_id == customer.customer_id
                        && matches!(
                            t.tx_type,
                            PointTransactionType::Redeem | PointTransactionType::Adjust
                        )
                        && !is_recalc_correction(t)
                })
                .map(|t| t.points)
                .sum();

            let new_balance = (target_earned + non_sales_balance).max(0);
            let diff = new_balance - customer.points;

            (diff != 0).then(|| BalanceCorrection {
                customer_id: customer.customer_id.clone(),
                previous: customer.points,
                new_balance,
                diff,
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpendKind;
    use chrono::Utc;

    fn customer(id: &str, points: i64) -> CustomerBalance {
        CustomerBalance {
            customer_id: id.to_string(),
            name: format!("Customer {id}"),
            points,
        }
    }

    fn spend(customer_id: &str, amount: Money, day: u32) -> SpendRecord {
        SpendRecord {
            id: format!("sp-{customer_id}-{day}"),
            customer_id: customer_id.to_string(),
            event_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            kind: SpendKind::Purchase,
            amount,
        }
    }

    fn tx(customer_id: &str, tx_type: PointTransactionType, points: i64) -> PointTransaction {
        PointTransaction {
            id: format!("tx-{customer_id}-{points}"),
            customer_id: customer_id.to_string(),
            tx_date: Utc::now(),
            tx_type,
            points,
            related_id: None,
            note: None,
        }
    }

    #[test]
    fn test_earned_points_floor() {
        assert_eq!(earned_points(Money::from_major(1000), 25), 40);
        assert_eq!(earned_points(Money::from_major(1024), 25), 40);
        assert_eq!(earned_points(Money::from_major(1025), 25), 41);
        assert_eq!(earned_points(Money::zero(), 25), 0);
        assert_eq!(earned_points(Money::from_major(-50), 25), 0);
        assert_eq!(earned_points(Money::from_major(1000), 0), 0);
    }

    /// 0 points, one 1,000.00 purchase, earn rate 25 → 40.
    #[test]
    fn test_fresh_customer_earns_forty() {
        let plan = plan_recalculation(
            &[customer("c1", 0)],
            &[],
            &[spend("c1", Money::from_major(1000), 10)],
            25,
            &RecalcWindow::all(),
        );

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].new_balance, 40);
        assert_eq!(plan[0].diff, 40);
    }

    /// Continuing from a 40-point balance: after a -10 redeem, the next run lands on
    /// 30 (40 target-earned plus the -10 non-sales balance).
    #[test]
    fn test_redeem_counts_as_non_sales() {
        let plan = plan_recalculation(
            &[customer("c1", 40)],
            &[tx("c1", PointTransactionType::Redeem, -10)],
            &[spend("c1", Money::from_major(1000), 10)],
            25,
            &RecalcWindow::all(),
        );

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].new_balance, 30);
        assert_eq!(plan[0].diff, -10);
    }

    /// Idempotence: a balance already matching the target produces no
    /// correction at all.
    #[test]
    fn test_in_sync_customer_untouched() {
        let plan = plan_recalculation(
            &[customer("c1", 40)],
            &[],
            &[spend("c1", Money::from_major(1000), 10)],
            25,
            &RecalcWindow::all(),
        );
        assert!(plan.is_empty());
    }

    /// Earn-type history is ignored: only spend drives the earned target.
    #[test]
    fn test_earn_transactions_excluded() {
        // Stale earn tx claims 500 points; spend says 40.
        let plan = plan_recalculation(
            &[customer("c1", 500)],
            &[tx("c1", PointTransactionType::Earn, 500)],
            &[spend("c1", Money::from_major(1000), 10)],
            25,
            &RecalcWindow::all(),
        );

        assert_eq!(plan[0].new_balance, 40);
        assert_eq!(plan[0].diff, -460);
    }

    /// A correction written by a previous run must not feed the next one,
    /// or every run would re-add it and the balance would walk away.
    #[test]
    fn test_prior_corrections_excluded() {
        let mut correction = tx("c1", PointTransactionType::Adjust, 40);
        correction.related_id = Some(format!("{RECALC_RUN_PREFIX}run-1"));

        let plan = plan_recalculation(
            &[customer("c1", 40)],
            &[correction],
            &[spend("c1", Money::from_major(1000), 10)],
            25,
            &RecalcWindow::all(),
        );
        assert!(plan.is_empty());
    }

    /// Manual adjustments (no run marker) still count as non-sales balance.
    #[test]
    fn test_manual_adjust_included() {
        let plan = plan_recalculation(
            &[customer("c1", 40)],
            &[tx("c1", PointTransactionType::Adjust, 15)],
            &[spend("c1", Money::from_major(1000), 10)],
            25,
            &RecalcWindow::all(),
        );

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].new_balance, 55);
    }

    #[test]
    fn test_clamped_at_zero() {
        // Redeemed more than was ever earned
        let plan = plan_recalculation(
            &[customer("c1", 5)],
            &[tx("c1", PointTransactionType::Redeem, -100)],
            &[spend("c1", Money::from_major(1000), 10)],
            25,
            &RecalcWindow::all(),
        );

        assert_eq!(plan[0].new_balance, 0);
        assert_eq!(plan[0].diff, -5);
    }

    #[test]
    fn test_window_bounds_spend_only() {
        let window = RecalcWindow::between(
            NaiveDate::from_ymd_opt(2026, 3, 5),
            NaiveDate::from_ymd_opt(2026, 3, 20),
        );

        let plan = plan_recalculation(
            &[customer("c1", 0)],
            // Out-of-range redeem still counts (all of history)
            &[tx("c1", PointTransactionType::Redeem, -4)],
            &[
                spend("c1", Money::from_major(1000), 10), // inside
                spend("c1", Money::from_major(9000), 25), // outside
            ],
            25,
            &window,
        );

        // floor(1000/25) = 40, minus 4 redeemed
        assert_eq!(plan[0].new_balance, 36);
    }

    #[test]
    fn test_multiple_customers_planned_independently() {
        let plan = plan_recalculation(
            &[customer("c1", 0), customer("c2", 40), customer("c3", 7)],
            &[],
            &[
                spend("c1", Money::from_major(1000), 10),
                spend("c2", Money::from_major(1000), 11),
            ],
            25,
            &RecalcWindow::all(),
        );

        // c1 drifts up, c2 is in sync, c3 drifts down to zero
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].customer_id, "c1");
        assert_eq!(plan[0].diff, 40);
        assert_eq!(plan[1].customer_id, "c3");
        assert_eq!(plan[1].diff, -7);
    }
}
