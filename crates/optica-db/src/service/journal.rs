//! # Journal Ledger Service
//!
//! Posting, editing and deleting journal entries.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  post(new_entry)                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  period_of(entry_date) ──► lock record exists? ──► Err(PeriodLocked)   │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  BalancePolicy::Strict? ──► validate_balanced(lines)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  stamp id/author/timestamp ──► INSERT ──► audit (best effort)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lock Semantics
//! Only `post` consults the period lock. `update` and `delete` go through
//! regardless of the entry's period, and an update may even move an entry
//! INTO a locked month. That asymmetry is the system's historical
//! behavior, kept as-is.
//!
//! The lock check and the insert are two separate statements; a close
//! racing between them can let one entry slip into a just-locked month.
//! Accepted for a single-operator back office.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DbError, LedgerResult};
use crate::repository::audit::AuditLogRepository;
use crate::repository::journal::JournalEntryRepository;
use crate::repository::periods::PeriodRepository;
use optica_core::types::{period_of, AuditAction, JournalEntry, JournalEntryPatch, NewJournalEntry};
use optica_core::validation::validate_balanced;
use optica_core::CoreError;

const AUDIT_MODULE: &str = "accounting";

/// Whether the ledger enforces the double-entry invariant at the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalancePolicy {
    /// Accept whatever lines the caller built (historical behavior; the
    /// posting engine is trusted to produce balanced entries).
    #[default]
    Lenient,
    /// Reject unbalanced entries with [`CoreError::UnbalancedEntry`].
    Strict,
}

/// The journal entry service.
#[derive(Debug, Clone)]
pub struct JournalLedger {
    entries: JournalEntryRepository,
    periods: PeriodRepository,
    audit: AuditLogRepository,
    policy: BalancePolicy,
}

impl JournalLedger {
    /// Creates a ledger with the lenient balance policy.
    pub fn new(pool: SqlitePool) -> Self {
        JournalLedger {
            entries: JournalEntryRepository::new(pool.clone()),
            periods: PeriodRepository::new(pool.clone()),
            audit: AuditLogRepository::new(pool),
            policy: BalancePolicy::default(),
        }
    }

    /// Switches the balance policy.
    pub fn with_policy(mut self, policy: BalancePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Posts a new journal entry and returns its id.
    ///
    /// ## Errors
    /// - [`CoreError::PeriodLocked`] when the entry date falls in a
    ///   closed month
    /// - [`CoreError::UnbalancedEntry`] under [`BalancePolicy::Strict`]
    pub async fn post(&self, new_entry: NewJournalEntry, actor: &str) -> LedgerResult<String> {
        let (year, month) = period_of(new_entry.entry_date);
        if let Some(period) = self.periods.find(year, month).await? {
            if period.is_closed {
                warn!(year, month, reference = %new_entry.reference, "Post rejected: period locked");
                return Err(CoreError::PeriodLocked { year, month }.into());
            }
        }

        if self.policy == BalancePolicy::Strict {
            validate_balanced(&new_entry.lines)?;
        }

        let entry = new_entry.into_entry(
            Uuid::new_v4().to_string(),
            actor.to_string(),
            Utc::now(),
        );
        self.entries.insert(&entry).await?;

        info!(
            id = %entry.id,
            reference = %entry.reference,
            total = %entry.total_amount,
            "Journal entry posted"
        );
        self.audit_entry(AuditAction::Create, &entry.id, "Journal entry posted", None, Some(&entry), actor)
            .await;

        Ok(entry.id)
    }

    /// Applies a partial update to an existing entry.
    ///
    /// An empty patch is a no-op that still verifies the entry exists.
    /// No period lock check here (see module docs).
    pub async fn update(&self, id: &str, patch: &JournalEntryPatch, actor: &str) -> LedgerResult<()> {
        let mut entry = self
            .entries
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("JournalEntry", id))?;

        if patch.is_empty() {
            return Ok(());
        }

        let before = entry.clone();
        patch.apply(&mut entry);

        if self.policy == BalancePolicy::Strict {
            validate_balanced(&entry.lines)?;
        }

        self.entries.update(&entry).await?;

        info!(id = %id, "Journal entry updated");
        self.audit_entry(AuditAction::Update, id, "Journal entry updated", Some(&before), Some(&entry), actor)
            .await;

        Ok(())
    }

    /// Deletes an entry. No period lock check here (see module docs).
    pub async fn delete(&self, id: &str, actor: &str) -> LedgerResult<()> {
        let entry = self
            .entries
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("JournalEntry", id))?;

        self.entries.delete(id).await?;

        info!(id = %id, reference = %entry.reference, "Journal entry deleted");
        self.audit_entry(AuditAction::Delete, id, "Journal entry deleted", Some(&entry), None, actor)
            .await;

        Ok(())
    }

    /// Best-effort audit write; a failed record must not fail the ledger
    /// operation that already committed.
    async fn audit_entry(
        &self,
        action: AuditAction,
        id: &str,
        description: &str,
        before: Option<&JournalEntry>,
        after: Option<&JournalEntry>,
        actor: &str,
    ) {
        let before = before.and_then(|e| serde_json::to_value(e).ok());
        let after = after.and_then(|e| serde_json::to_value(e).ok());

        if let Err(err) = self
            .audit
            .record(action, AUDIT_MODULE, description, Some(id), before, after, actor)
            .await
        {
            warn!(id = %id, error = %err, "Audit record failed");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
