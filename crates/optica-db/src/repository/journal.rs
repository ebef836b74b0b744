//! # Journal Entry Repository
//!
//! Database operations for journal entries.
//!
//! ## Storage Shape
//! Lines are stored as a JSON array in the `lines` column: entries are
//! always read and written whole, and nothing queries individual lines.
//! The denormalized `total_cents` column keeps listings cheap.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use optica_core::money::Money;
use optica_core::types::{EntryStatus, JournalEntry, JournalLine, ModuleSource};

/// Repository for journal entry database operations.
#[derive(Debug, Clone)]
pub struct JournalEntryRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct JournalEntryRow {
    id: String,
    entry_date: NaiveDate,
    reference: String,
    description: String,
    lines: String,
    total_cents: i64,
    status: String,
    module_source: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl JournalEntryRow {
    fn into_entry(self) -> DbResult<JournalEntry> {
        let lines: Vec<JournalLine> = serde_json::from_str(&self.lines)?;
        let status = EntryStatus::parse(&self.status)
            .ok_or_else(|| DbError::Internal(format!("unknown entry status: {}", self.status)))?;
        let module_source = ModuleSource::parse(&self.module_source).ok_or_else(|| {
            DbError::Internal(format!("unknown module source: {}", self.module_source))
        })?;

        Ok(JournalEntry {
            id: self.id,
            entry_date: self.entry_date,
            reference: self.reference,
            description: self.description,
            lines,
            total_amount: Money::from_cents(self.total_cents),
            status,
            module_source,
            created_by: self.created_by,
            created_at: self.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, entry_date, reference, description, lines,
           total_cents, status, module_source, created_by, created_at
    FROM journal_entries
"#;

impl JournalEntryRepository {
    /// Creates a new JournalEntryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        JournalEntryRepository { pool }
    }

    /// Inserts a complete journal entry.
    pub async fn insert(&self, entry: &JournalEntry) -> DbResult<()> {
        debug!(id = %entry.id, reference = %entry.reference, "Inserting journal entry");

        let lines = serde_json::to_string(&entry.lines)?;

        sqlx::query(
            r#"
            INSERT INTO journal_entries (
                id, entry_date, reference, description, lines,
                total_cents, status, module_source, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.entry_date)
        .bind(&entry.reference)
        .bind(&entry.description)
        .bind(lines)
        .bind(entry.total_amount.cents())
        .bind(entry.status.as_str())
        .bind(entry.module_source.as_str())
        .bind(&entry.created_by)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an entry by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<JournalEntry>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row: Option<JournalEntryRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(JournalEntryRow::into_entry).transpose()
    }

    /// Rewrites an entry in full (the service applies the patch first).
    pub async fn update(&self, entry: &JournalEntry) -> DbResult<()> {
        debug!(id = %entry.id, "Updating journal entry");

        let lines = serde_json::to_string(&entry.lines)?;

        let result = sqlx::query(
            r#"
            UPDATE journal_entries
            SET entry_date = ?2,
                reference = ?3,
                description = ?4,
                lines = ?5,
                total_cents = ?6,
                status = ?7,
                module_source = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&entry.id)
        .bind(entry.entry_date)
        .bind(&entry.reference)
        .bind(&entry.description)
        .bind(lines)
        .bind(entry.total_amount.cents())
        .bind(entry.status.as_str())
        .bind(entry.module_source.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("JournalEntry", &entry.id));
        }

        Ok(())
    }

    /// Deletes an entry outright.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting journal entry");

        let result = sqlx::query("DELETE FROM journal_entries WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("JournalEntry", id));
        }

        Ok(())
    }

    /// Most recent entries, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<JournalEntry>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY entry_date DESC, created_at DESC LIMIT ?1");
        let rows: Vec<JournalEntryRow> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(JournalEntryRow::into_entry).collect()
    }

    /// All entries dated inside one accounting period.
    pub async fn list_by_period(&self, year: i32, month: u32) -> DbResult<Vec<JournalEntry>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| DbError::Internal(format!("invalid period {year}-{month:02}")))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| DbError::Internal(format!("invalid period {year}-{month:02}")))?;

        let sql = format!("{SELECT_COLUMNS} WHERE entry_date >= ?1 AND entry_date < ?2 ORDER BY entry_date");
        let rows: Vec<JournalEntryRow> = sqlx::query_as(&sql)
            .bind(first)
            .bind(next)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(JournalEntryRow::into_entry).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use optica_core::types::NewJournalEntry;

    fn sample_entry(id: &str, day: u32) -> JournalEntry {
        NewJournalEntry {
            entry_date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            reference: format!("REF-{id}"),
            description: "manual entry".to_string(),
            lines: vec![],
            total_amount: Money::from_major(100),
            status: EntryStatus::Posted,
            module_source: ModuleSource::Manual,
        }
        .into_entry(id.to_string(), "tester".to_string(), Utc::now())
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.journal_entries();

        let entry = sample_entry("e1", 10);
        repo.insert(&entry).await.unwrap();

        let loaded = repo.get_by_id("e1").await.unwrap().unwrap();
        assert_eq!(loaded.reference, "REF-e1");
        assert_eq!(loaded.total_amount, Money::from_major(100));
        assert_eq!(loaded.status, EntryStatus::Posted);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_missing_entry_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.journal_entries();

        let err = repo.update(&sample_entry("ghost", 1)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = repo.delete("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_by_period_brackets_month() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.journal_entries();

        repo.insert(&sample_entry("march", 15)).await.unwrap();
        let mut april = sample_entry("april", 1);
        april.entry_date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        repo.insert(&april).await.unwrap();

        let march = repo.list_by_period(2026, 3).await.unwrap();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].id, "march");

        let december = repo.list_by_period(2026, 12).await.unwrap();
        assert!(december.is_empty());
    }
}
