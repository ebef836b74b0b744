//! # Audit Log Repository
//!
//! Persists the audit trail the ledger services emit after every
//! mutating operation.
//!
//! ## Best-Effort Contract
//! The ledger calls the audit sink but does not depend on its success:
//! services log a warning and move on when a record fails to land. That
//! is why `record` returns a plain `DbResult` and never panics.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use optica_core::types::AuditAction;

/// One persisted audit record.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: String,
    pub action: AuditAction,
    pub module: String,
    pub description: String,
    pub ref_id: Option<String>,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: String,
    action: String,
    module: String,
    description: String,
    ref_id: Option<String>,
    before_snapshot: Option<String>,
    after_snapshot: Option<String>,
    actor: String,
    created_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_record(self) -> DbResult<AuditRecord> {
        let action = AuditAction::parse(&self.action)
            .ok_or_else(|| DbError::Internal(format!("unknown audit action: {}", self.action)))?;
        let before = self
            .before_snapshot
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let after = self
            .after_snapshot
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(AuditRecord {
            id: self.id,
            action,
            module: self.module,
            description: self.description,
            ref_id: self.ref_id,
            before,
            after,
            actor: self.actor,
            created_at: self.created_at,
        })
    }
}

/// Repository for the audit trail.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    /// Creates a new AuditLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AuditLogRepository { pool }
    }

    /// Appends one audit record and returns its id.
    #[allow(clippy::too_many_arguments)]
    pub async fn record(
        &self,
        action: AuditAction,
        module: &str,
        description: &str,
        ref_id: Option<&str>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
        actor: &str,
    ) -> DbResult<String> {
        let id = Uuid::new_v4().to_string();
        debug!(action = action.as_str(), module, ref_id, "Recording audit entry");

        let before = before.map(|v| v.to_string());
        let after = after.map(|v| v.to_string());

        sqlx::query(
            r#"
            INSERT INTO audit_log (
                id, action, module, description, ref_id,
                before_snapshot, after_snapshot, actor, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(action.as_str())
        .bind(module)
        .bind(description)
        .bind(ref_id)
        .bind(before)
        .bind(after)
        .bind(actor)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// The trail of a single entity, oldest first.
    pub async fn list_for_ref(&self, ref_id: &str) -> DbResult<Vec<AuditRecord>> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            r#"
            SELECT id, action, module, description, ref_id,
                   before_snapshot, after_snapshot, actor, created_at
            FROM audit_log
            WHERE ref_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(ref_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditRow::into_record).collect()
    }

    /// Most recent records, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<AuditRecord>> {
        let rows: Vec<AuditRow> = sqlx::query_as(
            r#"
            SELECT id, action, module, description, ref_id,
                   before_snapshot, after_snapshot, actor, created_at
            FROM audit_log
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditRow::into_record).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
