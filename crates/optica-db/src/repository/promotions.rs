//! # Promotion Repository
//!
//! Configured promotions. The rule payload is stored as a tagged JSON
//! object so new rule kinds don't need schema changes.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use optica_core::promotion::{Promotion, PromotionRule};

/// Repository for promotion configuration.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct PromotionRow {
    id: String,
    name: String,
    is_active: i64,
    starts_on: NaiveDate,
    ends_on: NaiveDate,
    rule: String,
}

impl PromotionRow {
    fn into_promotion(self) -> DbResult<Promotion> {
        let rule: PromotionRule = serde_json::from_str(&self.rule)?;
        Ok(Promotion {
            id: self.id,
            name: self.name,
            is_active: self.is_active != 0,
            starts_on: self.starts_on,
            ends_on: self.ends_on,
            rule,
        })
    }
}

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Inserts a promotion (admin/seed path).
    pub async fn insert(&self, promotion: &Promotion) -> DbResult<()> {
        let rule = serde_json::to_string(&promotion.rule)?;

        sqlx::query(
            r#"
            INSERT INTO promotions (id, name, is_active, starts_on, ends_on, rule)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&promotion.id)
        .bind(&promotion.name)
        .bind(promotion.is_active as i64)
        .bind(promotion.starts_on)
        .bind(promotion.ends_on)
        .bind(rule)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a promotion by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Promotion>> {
        let row: Option<PromotionRow> = sqlx::query_as(
            "SELECT id, name, is_active, starts_on, ends_on, rule FROM promotions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PromotionRow::into_promotion).transpose()
    }

    /// Every configured promotion. Window/active filtering happens in the
    /// pure calculator, which needs the full picture anyway.
    pub async fn list_all(&self) -> DbResult<Vec<Promotion>> {
        let rows: Vec<PromotionRow> = sqlx::query_as(
            "SELECT id, name, is_active, starts_on, ends_on, rule FROM promotions ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PromotionRow::into_promotion).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use optica_core::money::Money;

    fn promo(id: &str) -> Promotion {
        Promotion {
            id: id.to_string(),
            name: format!("Promo {id}"),
            is_active: true,
            starts_on: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            ends_on: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            rule: PromotionRule::SpendSave {
                min_spend: Money::from_major(500),
                discount: Money::from_major(50),
            },
        }
    }

    #[tokio::test]
    async fn test_rule_json_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();

        repo.insert(&promo("p1")).await.unwrap();

        let loaded = repo.get_by_id("p1").await.unwrap().unwrap();
        assert!(loaded.is_active);
        match loaded.rule {
            PromotionRule::SpendSave {
                min_spend,
                discount,
            } => {
                assert_eq!(min_spend, Money::from_major(500));
                assert_eq!(discount, Money::from_major(50));
            }
            other => panic!("wrong rule kind: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_corrupt_rule_is_serialization_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();

        sqlx::query(
            r#"
            INSERT INTO promotions (id, name, is_active, starts_on, ends_on, rule)
            VALUES ('bad', 'Bad', 1, '2026-01-01', '2026-12-31', 'not json')
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = repo.get_by_id("bad").await.unwrap_err();
        assert!(matches!(err, DbError::Serialization(_)));
    }
}
