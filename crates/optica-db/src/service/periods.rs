//! # Period Lock Manager
//!
//! Closing and reopening accounting months.
//!
//! ## Semantics
//! - A month is locked iff a lock record exists for its (year, month).
//! - `close` is idempotent: closing a closed month logs and succeeds.
//! - `reopen` deletes the record; reopening an open month is a no-op.
//! - Locks only gate NEW postings; existing entries in the month stay
//!   editable through the journal ledger.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::LedgerResult;
use crate::repository::audit::AuditLogRepository;
use crate::repository::periods::PeriodRepository;
use optica_core::types::{AccountingPeriod, AuditAction};
use optica_core::validation::validate_month;
use optica_core::CoreError;

const AUDIT_MODULE: &str = "accounting";

/// Service for month-end close and reopen.
#[derive(Debug, Clone)]
pub struct PeriodLockManager {
    periods: PeriodRepository,
    audit: AuditLogRepository,
}

impl PeriodLockManager {
    /// Creates a new PeriodLockManager.
    pub fn new(pool: SqlitePool) -> Self {
        PeriodLockManager {
            periods: PeriodRepository::new(pool.clone()),
            audit: AuditLogRepository::new(pool),
        }
    }

    /// Closes a month. Idempotent: an already-closed month succeeds
    /// without inserting a second record.
    pub async fn close(&self, year: i32, month: u32, actor: &str) -> LedgerResult<()> {
        validate_month(month).map_err(CoreError::from)?;

        if let Some(existing) = self.periods.find(year, month).await? {
            warn!(
                year,
                month,
                closed_by = %existing.closed_by,
                "Period already closed, nothing to do"
            );
            return Ok(());
        }

        let period = AccountingPeriod {
            id: Uuid::new_v4().to_string(),
            year,
            month,
            is_closed: true,
            closed_by: actor.to_string(),
            closed_at: Utc::now(),
        };
        self.periods.insert(&period).await?;

        info!(year, month, actor = %actor, "Accounting period closed");
        self.audit_period(
            AuditAction::Create,
            &format!("Period {year}-{month:02} closed"),
            year,
            month,
            actor,
        )
        .await;

        Ok(())
    }

    /// Reopens a month by deleting its lock record. Reopening an open
    /// month is a silent no-op.
    pub async fn reopen(&self, year: i32, month: u32, actor: &str) -> LedgerResult<()> {
        validate_month(month).map_err(CoreError::from)?;

        let deleted = self.periods.delete(year, month).await?;
        if !deleted {
            return Ok(());
        }

        info!(year, month, actor = %actor, "Accounting period reopened");
        self.audit_period(
            AuditAction::Delete,
            &format!("Period {year}-{month:02} reopened"),
            year,
            month,
            actor,
        )
        .await;

        Ok(())
    }

    /// Whether a (year, month) is currently closed.
    pub async fn is_locked(&self, year: i32, month: u32) -> LedgerResult<bool> {
        Ok(self
            .periods
            .find(year, month)
            .await?
            .map(|p| p.is_closed)
            .unwrap_or(false))
    }

    /// All currently closed periods, oldest first.
    pub async fn closed_periods(&self) -> LedgerResult<Vec<AccountingPeriod>> {
        Ok(self.periods.list_all().await?)
    }

    async fn audit_period(
        &self,
        action: AuditAction,
        description: &str,
        year: i32,
        month: u32,
        actor: &str,
    ) {
        let ref_id = format!("period-{year}-{month:02}");
        if let Err(err) = self
            .audit
            .record(action, AUDIT_MODULE, description, Some(&ref_id), None, None, actor)
            .await
        {
            warn!(year, month, error = %err, "Audit record failed");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
