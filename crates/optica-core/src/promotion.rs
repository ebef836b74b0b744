//! # Promotion Discount Calculator
//!
//! Evaluates active promotions against a prospective frame + lens sale and
//! the customer's loyalty tier.
//!
//! ## Rule Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bundle_frame_lens │ lens free up to a cap, needs frame AND lens        │
//! │  tier_discount     │ total × tier rate (Bronze..Platinum)               │
//! │  spend_save        │ flat amount once total ≥ minimum spend             │
//! │  time_based        │ total × percent inside a time-of-day window        │
//! │  brand_discount    │ frame × percent when brand name matches            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Output is every applicable promotion with its discount, sorted
//! descending by amount. The caller (typically the sales screen) picks
//! one, or lets the user choose. Discounts are floored, never rounded up.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Customer Tiers
// =============================================================================

/// Minimum point balance for Silver tier.
pub const SILVER_MIN_POINTS: i64 = 1_000;
/// Minimum point balance for Gold tier.
pub const GOLD_MIN_POINTS: i64 = 5_000;
/// Minimum point balance for Platinum tier.
pub const PLATINUM_MIN_POINTS: i64 = 10_000;

/// Loyalty tier derived from the customer's current point balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl CustomerTier {
    /// Tier from a point balance by the fixed thresholds.
    ///
    /// ## Example
    /// ```rust
    /// use optica_core::promotion::CustomerTier;
    ///
    /// assert_eq!(CustomerTier::from_points(0), CustomerTier::Bronze);
    /// assert_eq!(CustomerTier::from_points(1_000), CustomerTier::Silver);
    /// assert_eq!(CustomerTier::from_points(12_000), CustomerTier::Platinum);
    /// ```
    pub fn from_points(points: i64) -> Self {
        if points >= PLATINUM_MIN_POINTS {
            CustomerTier::Platinum
        } else if points >= GOLD_MIN_POINTS {
            CustomerTier::Gold
        } else if points >= SILVER_MIN_POINTS {
            CustomerTier::Silver
        } else {
            CustomerTier::Bronze
        }
    }
}

/// Per-tier whole-percent discount rates for `tier_discount` promotions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TierRates {
    pub bronze: u32,
    pub silver: u32,
    pub gold: u32,
    pub platinum: u32,
}

impl TierRates {
    /// The rate for a given tier.
    pub fn rate_for(&self, tier: CustomerTier) -> u32 {
        match tier {
            CustomerTier::Bronze => self.bronze,
            CustomerTier::Silver => self.silver,
            CustomerTier::Gold => self.gold,
            CustomerTier::Platinum => self.platinum,
        }
    }
}

// =============================================================================
// Promotions
// =============================================================================

/// The five configurable rule kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromotionRule {
    /// Lens discounted up to a cap when frame and lens are bought together.
    BundleFrameLens { max_discount: Money },
    /// Percentage of the total by loyalty tier.
    TierDiscount { rates: TierRates },
    /// Flat discount once the total reaches a minimum spend.
    SpendSave { min_spend: Money, discount: Money },
    /// Percentage of the total inside a time-of-day window (happy hour).
    TimeBased {
        from: NaiveTime,
        to: NaiveTime,
        percent: u32,
    },
    /// Percentage of the frame price for a matching brand.
    BrandDiscount { brand: String, percent: u32 },
}

/// A configured promotion with its validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub rule: PromotionRule,
}

impl Promotion {
    /// Whether the promotion is active and its date window covers `on`.
    pub fn in_window(&self, on: NaiveDate) -> bool {
        self.is_active && self.starts_on <= on && on <= self.ends_on
    }
}

/// One applicable promotion and the discount it would grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionQuote {
    pub promotion: Promotion,
    pub discount: Money,
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates a single rule. `None` means not applicable (or a zero
/// discount, which is treated the same way).
fn evaluate_rule(
    rule: &PromotionRule,
    tier: CustomerTier,
    frame_price: Money,
    lens_price: Money,
    brand: Option<&str>,
    at: NaiveDateTime,
) -> Option<Money> {
    let total = frame_price + lens_price;

    let discount = match rule {
        PromotionRule::BundleFrameLens { max_discount } => {
            if frame_price.is_positive() && lens_price.is_positive() {
                lens_price.min(*max_discount)
            } else {
                return None;
            }
        }

        PromotionRule::TierDiscount { rates } => total.percentage(rates.rate_for(tier)),

        PromotionRule::SpendSave {
            min_spend,
            discount,
        } => {
            if total >= *min_spend {
                *discount
            } else {
                return None;
            }
        }

        PromotionRule::TimeBased { from, to, percent } => {
            let time = at.time();
            if *from <= time && time <= *to {
                total.percentage(*percent)
            } else {
                return None;
            }
        }

        PromotionRule::BrandDiscount { brand: target, percent } => {
            let name = brand?;
            if name.to_lowercase().contains(&target.to_lowercase()) {
                frame_price.percentage(*percent)
            } else {
                return None;
            }
        }
    };

    discount.is_positive().then_some(discount)
}

/// Computes every applicable promotion for a prospective sale.
///
/// ## Arguments
/// * `promotions` - the configured promotions (active or not; filtered here)
/// * `customer_points` - current balance, used to derive the tier
/// * `frame_price` / `lens_price` - line prices of the prospective sale
/// * `brand` - frame brand, if known (drives `brand_discount`)
/// * `at` - "now"; date gates the validity window, time gates `time_based`
///
/// ## Returns
/// Quotes sorted descending by discount amount. The caller picks one,
/// typically the largest.
pub fn applicable_promotions(
    promotions: &[Promotion],
    customer_points: i64,
    frame_price: Money,
    lens_price: Money,
    brand: Option<&str>,
    at: NaiveDateTime,
) -> Vec<PromotionQuote> {
    let tier = CustomerTier::from_points(customer_points);
    let today = at.date();

    let mut quotes: Vec<PromotionQuote> = promotions
        .iter()
        .filter(|p| p.in_window(today))
        .filter_map(|p| {
            evaluate_rule(&p.rule, tier, frame_price, lens_price, brand, at).map(|discount| {
                PromotionQuote {
                    promotion: p.clone(),
                    discount,
                }
            })
        })
        .collect();

    quotes.sort_by(|a, b| b.discount.cmp(&a.discount));
    quotes
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn promo(id: &str, rule: PromotionRule) -> Promotion {
        Promotion {
            id: id.to_string(),
            name: format!("Promo {id}"),
            is_active: true,
            starts_on: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            ends_on: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            rule,
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(CustomerTier::from_points(0), CustomerTier::Bronze);
        assert_eq!(CustomerTier::from_points(999), CustomerTier::Bronze);
        assert_eq!(CustomerTier::from_points(1_000), CustomerTier::Silver);
        assert_eq!(CustomerTier::from_points(5_000), CustomerTier::Gold);
        assert_eq!(CustomerTier::from_points(10_000), CustomerTier::Platinum);
    }

    #[test]
    fn test_bundle_needs_both_prices() {
        let promos = vec![promo(
            "bundle",
            PromotionRule::BundleFrameLens {
                max_discount: Money::from_major(150),
            },
        )];

        // Lens cheaper than the cap: whole lens discounted
        let quotes = applicable_promotions(
            &promos,
            0,
            Money::from_major(300),
            Money::from_major(120),
            None,
            noon(),
        );
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].discount, Money::from_major(120));

        // Lens over the cap: capped
        let quotes = applicable_promotions(
            &promos,
            0,
            Money::from_major(300),
            Money::from_major(200),
            None,
            noon(),
        );
        assert_eq!(quotes[0].discount, Money::from_major(150));

        // No frame: not applicable
        let quotes = applicable_promotions(
            &promos,
            0,
            Money::zero(),
            Money::from_major(200),
            None,
            noon(),
        );
        assert!(quotes.is_empty());
    }

    #[test]
    fn test_tier_discount_uses_balance() {
        let promos = vec![promo(
            "tier",
            PromotionRule::TierDiscount {
                rates: TierRates {
                    bronze: 0,
                    silver: 3,
                    gold: 5,
                    platinum: 10,
                },
            },
        )];

        // Gold customer: 5% of 1,000.00 = 50.00
        let quotes = applicable_promotions(
            &promos,
            6_000,
            Money::from_major(700),
            Money::from_major(300),
            None,
            noon(),
        );
        assert_eq!(quotes[0].discount, Money::from_major(50));

        // Bronze rate is 0%: nothing to offer
        let quotes = applicable_promotions(
            &promos,
            100,
            Money::from_major(700),
            Money::from_major(300),
            None,
            noon(),
        );
        assert!(quotes.is_empty());
    }

    /// Min spend 500 excludes a 400 total, includes 600.
    #[test]
    fn test_spend_save_boundary() {
        let promos = vec![promo(
            "save",
            PromotionRule::SpendSave {
                min_spend: Money::from_major(500),
                discount: Money::from_major(50),
            },
        )];

        let quotes = applicable_promotions(
            &promos,
            0,
            Money::from_major(400),
            Money::zero(),
            None,
            noon(),
        );
        assert!(quotes.is_empty());

        let quotes = applicable_promotions(
            &promos,
            0,
            Money::from_major(600),
            Money::zero(),
            None,
            noon(),
        );
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].discount, Money::from_major(50));
    }

    #[test]
    fn test_time_window() {
        let promos = vec![promo(
            "happy",
            PromotionRule::TimeBased {
                from: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                to: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
                percent: 10,
            },
        )];

        let evening = NaiveDate::from_ymd_opt(2026, 6, 15)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        let quotes = applicable_promotions(
            &promos,
            0,
            Money::from_major(500),
            Money::zero(),
            None,
            evening,
        );
        assert_eq!(quotes[0].discount, Money::from_major(50));

        // Outside the window
        let quotes = applicable_promotions(
            &promos,
            0,
            Money::from_major(500),
            Money::zero(),
            None,
            noon(),
        );
        assert!(quotes.is_empty());
    }

    #[test]
    fn test_brand_match_is_case_insensitive_substring() {
        let promos = vec![promo(
            "brand",
            PromotionRule::BrandDiscount {
                brand: "rayban".to_string(),
                percent: 20,
            },
        )];

        let quotes = applicable_promotions(
            &promos,
            0,
            Money::from_major(400),
            Money::from_major(100),
            Some("RayBan Aviator"),
            noon(),
        );
        assert_eq!(quotes.len(), 1);
        // 20% of the frame price only
        assert_eq!(quotes[0].discount, Money::from_major(80));

        let quotes = applicable_promotions(
            &promos,
            0,
            Money::from_major(400),
            Money::from_major(100),
            Some("Oakley"),
            noon(),
        );
        assert!(quotes.is_empty());

        // No brand given at all
        let quotes = applicable_promotions(
            &promos,
            0,
            Money::from_major(400),
            Money::from_major(100),
            None,
            noon(),
        );
        assert!(quotes.is_empty());
    }

    #[test]
    fn test_expired_or_inactive_excluded() {
        let mut expired = promo(
            "old",
            PromotionRule::SpendSave {
                min_spend: Money::zero(),
                discount: Money::from_major(10),
            },
        );
        expired.ends_on = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();

        let mut inactive = promo(
            "off",
            PromotionRule::SpendSave {
                min_spend: Money::zero(),
                discount: Money::from_major(10),
            },
        );
        inactive.is_active = false;

        let quotes = applicable_promotions(
            &[expired, inactive],
            0,
            Money::from_major(100),
            Money::zero(),
            None,
            noon(),
        );
        assert!(quotes.is_empty());
    }

    #[test]
    fn test_quotes_sorted_descending() {
        let promos = vec![
            promo(
                "small",
                PromotionRule::SpendSave {
                    min_spend: Money::zero(),
                    discount: Money::from_major(20),
                },
            ),
            promo(
                "big",
                PromotionRule::SpendSave {
                    min_spend: Money::zero(),
                    discount: Money::from_major(75),
                },
            ),
        ];

        let quotes = applicable_promotions(
            &promos,
            0,
            Money::from_major(100),
            Money::zero(),
            None,
            noon(),
        );
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].promotion.id, "big");
        assert_eq!(quotes[1].promotion.id, "small");
    }
}
