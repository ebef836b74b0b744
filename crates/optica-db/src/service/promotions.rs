//! # Promotion Service
//!
//! Loads the customer's tier inputs and the configured promotions, then
//! hands off to the pure discount calculator. The selling screen picks
//! one of the returned quotes (usually the first, they arrive sorted by
//! discount descending).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, LedgerResult};
use crate::repository::points::PointRepository;
use crate::repository::promotions::PromotionRepository;
use optica_core::money::Money;
use optica_core::promotion::{applicable_promotions, PromotionQuote};

/// Read-side service quoting applicable discounts for a sale.
#[derive(Debug, Clone)]
pub struct PromotionService {
    promotions: PromotionRepository,
    points: PointRepository,
}

impl PromotionService {
    /// Creates a new PromotionService.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionService {
            promotions: PromotionRepository::new(pool.clone()),
            points: PointRepository::new(pool),
        }
    }

    /// Quotes every promotion applicable to a sale right now, sorted by
    /// discount descending.
    ///
    /// ## Errors
    /// [`DbError::NotFound`] when the customer has no balance row (the
    /// tier cannot be derived without one).
    pub async fn get_applicable(
        &self,
        customer_id: &str,
        frame_price: Money,
        lens_price: Money,
        brand: Option<&str>,
    ) -> LedgerResult<Vec<PromotionQuote>> {
        let balance = self
            .points
            .get_balance(customer_id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", customer_id))?;

        let promotions = self.promotions.list_all().await?;
        let quotes = applicable_promotions(
            &promotions,
            balance.points,
            frame_price,
            lens_price,
            brand,
            Utc::now().naive_local(),
        );

        debug!(
            customer_id = %customer_id,
            candidates = promotions.len(),
            applicable = quotes.len(),
            "Promotions quoted"
        );
        Ok(quotes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
