//! # Domain Types
//!
//! Core domain types used throughout the Optica back-office ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Account      │   │  JournalEntry   │   │ PointTransaction│       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (business)│   │  entry_date     │   │  customer_id    │       │
//! │  │  account_type   │   │  lines[]        │   │  tx_type        │       │
//! │  │  is_system      │   │  total_amount   │   │  points (±)     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ AccountingPeriod│   │   EntryStatus   │   │  ModuleSource   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  (year, month)  │   │  Draft          │   │  Sales          │       │
//! │  │  is_closed      │   │  Posted         │   │  Inventory      │       │
//! │  │  closed_by/at   │   │  Voided         │   │  Manual         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Accounts carry both:
//! - `id`: UUID v4 - immutable, referenced by journal lines
//! - `code`: business identifier ("1100", "4100", ...) used by the
//!   auto-posting rule table

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Period Keys
// =============================================================================

/// Returns the (year, month) accounting period a date belongs to.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use optica_core::types::period_of;
///
/// let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
/// assert_eq!(period_of(date), (2026, 3));
/// ```
#[inline]
pub fn period_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

// =============================================================================
// Chart of Accounts
// =============================================================================

/// Financial account category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountType {
    /// Stable string form used for TEXT storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
        }
    }

    /// Parses the stable string form. Returns `None` for unknown tags.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asset" => Some(AccountType::Asset),
            "liability" => Some(AccountType::Liability),
            "equity" => Some(AccountType::Equity),
            "revenue" => Some(AccountType::Revenue),
            "expense" => Some(AccountType::Expense),
            _ => None,
        }
    }
}

/// A financial account in the chart of accounts.
///
/// Immutable within this core: the ledger looks accounts up by `code`
/// but never creates or edits them (that belongs to setup/admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business account code ("1100" cash, "4100" revenue, ...).
    pub code: String,

    /// Display name, snapshotted onto journal lines at post time.
    pub name: String,

    /// Asset / Liability / Equity / Revenue / Expense.
    pub account_type: AccountType,

    /// System accounts are seeded and referenced by the posting rules;
    /// they cannot be removed through the admin UI.
    pub is_system: bool,
}

/// In-memory snapshot of the chart of accounts.
///
/// ## Usage
/// The storage layer loads all accounts once per operation and hands the
/// snapshot to the pure posting engine; the engine never touches the
/// database itself.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: Vec<Account>,
}

impl ChartOfAccounts {
    /// Builds a chart from a list of accounts.
    pub fn new(accounts: Vec<Account>) -> Self {
        ChartOfAccounts { accounts }
    }

    /// Looks an account up by business code.
    pub fn by_code(&self, code: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.code == code)
    }

    /// Looks an account up by id.
    pub fn by_id(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    /// All accounts in the chart.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }
}

// =============================================================================
// Journal Entries
// =============================================================================

/// A single debit or credit line within a journal entry.
///
/// Exactly one of debit/credit is nonzero in conventional double-entry
/// use. The model does not enforce that mechanically; the balance
/// invariant is checked over column totals instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account this line hits (UUID of a chart account).
    pub account_id: String,

    /// Account name at time of posting (frozen snapshot).
    pub account_name: String,

    /// Debit amount (zero if this is a credit line).
    pub debit: Money,

    /// Credit amount (zero if this is a debit line).
    pub credit: Money,
}

impl JournalLine {
    /// Builds a debit line against an account.
    pub fn debit(account: &Account, amount: Money) -> Self {
        JournalLine {
            account_id: account.id.clone(),
            account_name: account.name.clone(),
            debit: amount,
            credit: Money::zero(),
        }
    }

    /// Builds a credit line against an account.
    pub fn credit(account: &Account, amount: Money) -> Self {
        JournalLine {
            account_id: account.id.clone(),
            account_name: account.name.clone(),
            debit: Money::zero(),
            credit: amount,
        }
    }
}

/// Lifecycle status of a journal entry.
///
/// The auto-posting engine always writes `Posted`; the field exists so
/// manual workflows can stage drafts or void mistakes without deleting
/// history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Draft,
    #[default]
    Posted,
    Voided,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Posted => "posted",
            EntryStatus::Voided => "voided",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(EntryStatus::Draft),
            "posted" => Some(EntryStatus::Posted),
            "voided" => Some(EntryStatus::Voided),
            _ => None,
        }
    }
}

/// Which business process generated an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleSource {
    Sales,
    Inventory,
    Manual,
}

impl ModuleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleSource::Sales => "sales",
            ModuleSource::Inventory => "inventory",
            ModuleSource::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sales" => Some(ModuleSource::Sales),
            "inventory" => Some(ModuleSource::Inventory),
            "manual" => Some(ModuleSource::Manual),
            _ => None,
        }
    }
}

/// A posted journal entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    /// Business date; determines the accounting period.
    pub entry_date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub lines: Vec<JournalLine>,
    pub total_amount: Money,
    pub status: EntryStatus,
    pub module_source: ModuleSource,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// A journal entry as submitted by callers, before the ledger assigns
/// id / created_by / created_at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJournalEntry {
    pub entry_date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub lines: Vec<JournalLine>,
    pub total_amount: Money,
    pub status: EntryStatus,
    pub module_source: ModuleSource,
}

impl NewJournalEntry {
    /// Stamps identity and authorship, producing the persisted form.
    pub fn into_entry(self, id: String, created_by: String, created_at: DateTime<Utc>) -> JournalEntry {
        JournalEntry {
            id,
            entry_date: self.entry_date,
            reference: self.reference,
            description: self.description,
            lines: self.lines,
            total_amount: self.total_amount,
            status: self.status,
            module_source: self.module_source,
            created_by,
            created_at,
        }
    }
}

/// Partial update for a journal entry.
///
/// ## Note On Period Locks
/// Applying a patch does NOT re-check the period lock against the
/// (possibly changed) date. The lock gates `post` only; edits and
/// deletes of existing entries go through unchecked. Preserved
/// historical behavior of this system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JournalEntryPatch {
    pub entry_date: Option<NaiveDate>,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub lines: Option<Vec<JournalLine>>,
    pub total_amount: Option<Money>,
}

impl JournalEntryPatch {
    /// Applies the patch in place; unset fields are left untouched.
    pub fn apply(&self, entry: &mut JournalEntry) {
        if let Some(date) = self.entry_date {
            entry.entry_date = date;
        }
        if let Some(reference) = &self.reference {
            entry.reference = reference.clone();
        }
        if let Some(description) = &self.description {
            entry.description = description.clone();
        }
        if let Some(lines) = &self.lines {
            entry.lines = lines.clone();
        }
        if let Some(total) = self.total_amount {
            entry.total_amount = total;
        }
    }

    /// True when the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.entry_date.is_none()
            && self.reference.is_none()
            && self.description.is_none()
            && self.lines.is_none()
            && self.total_amount.is_none()
    }
}

// =============================================================================
// Accounting Periods
// =============================================================================

/// A closed accounting period (month lock).
///
/// A record exists only while the period is closed: closing creates it,
/// reopening deletes it. There is no "was once closed" history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingPeriod {
    pub id: String,
    pub year: i32,
    pub month: u32,
    pub is_closed: bool,
    pub closed_by: String,
    pub closed_at: DateTime<Utc>,
}

// =============================================================================
// Loyalty Points
// =============================================================================

/// Kind of point-balance delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointTransactionType {
    /// Earned from a sale (derived from spend / earn rate).
    Earn,
    /// Spent by the customer (negative points).
    Redeem,
    /// Manual or system correction (recalculation writes these).
    Adjust,
}

impl PointTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointTransactionType::Earn => "earn",
            PointTransactionType::Redeem => "redeem",
            PointTransactionType::Adjust => "adjust",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "earn" => Some(PointTransactionType::Earn),
            "redeem" => Some(PointTransactionType::Redeem),
            "adjust" => Some(PointTransactionType::Adjust),
            _ => None,
        }
    }
}

/// One append-only delta in a customer's point history.
///
/// Never mutated or deleted individually; corrections arrive as new
/// `Adjust` transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointTransaction {
    pub id: String,
    pub customer_id: String,
    pub tx_date: DateTime<Utc>,
    pub tx_type: PointTransactionType,
    /// Signed delta; negative for redemptions.
    pub points: i64,
    /// Source document id (sale, prescription, recalculation run).
    pub related_id: Option<String>,
    pub note: Option<String>,
}

/// Denormalized running balance row for one customer.
///
/// Target invariant (restored by recalculation, may drift in between):
/// `points == Σ PointTransaction.points` for the customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerBalance {
    pub customer_id: String,
    pub name: String,
    pub points: i64,
}

// =============================================================================
// Spend History (read-side)
// =============================================================================

/// Source of a spend record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendKind {
    Purchase,
    Prescription,
}

impl SpendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendKind::Purchase => "purchase",
            SpendKind::Prescription => "prescription",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(SpendKind::Purchase),
            "prescription" => Some(SpendKind::Prescription),
            _ => None,
        }
    }
}

/// One unit of ground-truth customer spend.
///
/// Purchases carry their total, prescriptions their net amount. Owned by
/// the sales modules; this core only reads them when replaying history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendRecord {
    pub id: String,
    pub customer_id: String,
    pub event_date: NaiveDate,
    pub kind: SpendKind,
    pub amount: Money,
}

// =============================================================================
// Audit Trail
// =============================================================================

/// What a mutating operation did, for the audit collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(AuditAction::Create),
            "update" => Some(AuditAction::Update),
            "delete" => Some(AuditAction::Delete),
            _ => None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn account(code: &str) -> Account {
        Account {
            id: format!("acc-{code}"),
            code: code.to_string(),
            name: format!("Account {code}"),
            account_type: AccountType::Asset,
            is_system: true,
        }
    }

    #[test]
    fn test_period_of() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(period_of(date), (2026, 3));
    }

    #[test]
    fn test_chart_lookup() {
        let chart = ChartOfAccounts::new(vec![account("1100"), account("4100")]);
        assert_eq!(chart.by_code("1100").unwrap().id, "acc-1100");
        assert_eq!(chart.by_id("acc-4100").unwrap().code, "4100");
        assert!(chart.by_code("9999").is_none());
    }

    #[test]
    fn test_line_constructors_snapshot_name() {
        let cash = account("1100");
        let line = JournalLine::debit(&cash, Money::from_major(50));
        assert_eq!(line.account_name, "Account 1100");
        assert_eq!(line.debit, Money::from_major(50));
        assert!(line.credit.is_zero());
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut entry = NewJournalEntry {
            entry_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            reference: "REF-1".to_string(),
            description: "original".to_string(),
            lines: vec![],
            total_amount: Money::from_major(100),
            status: EntryStatus::Posted,
            module_source: ModuleSource::Manual,
        }
        .into_entry("e1".to_string(), "tester".to_string(), Utc::now());

        let patch = JournalEntryPatch {
            description: Some("corrected".to_string()),
            ..Default::default()
        };
        patch.apply(&mut entry);

        assert_eq!(entry.description, "corrected");
        assert_eq!(entry.reference, "REF-1");
        assert_eq!(entry.total_amount, Money::from_major(100));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(JournalEntryPatch::default().is_empty());
        let patch = JournalEntryPatch {
            reference: Some("X".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_enum_round_trips() {
        for status in [EntryStatus::Draft, EntryStatus::Posted, EntryStatus::Voided] {
            assert_eq!(EntryStatus::parse(status.as_str()), Some(status));
        }
        for source in [ModuleSource::Sales, ModuleSource::Inventory, ModuleSource::Manual] {
            assert_eq!(ModuleSource::parse(source.as_str()), Some(source));
        }
        for kind in [
            PointTransactionType::Earn,
            PointTransactionType::Redeem,
            PointTransactionType::Adjust,
        ] {
            assert_eq!(PointTransactionType::parse(kind.as_str()), Some(kind));
        }
        assert!(EntryStatus::parse("bogus").is_none());
    }
}
