//! # Auto-Posting Rule Engine
//!
//! Translates business events into balanced journal lines.
//!
//! ## Rule Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Event               │ Debit                │ Credit                    │
//! │  ────────────────────┼──────────────────────┼────────────────────────── │
//! │  Inventory receipt   │ 1300 Inventory       │ 2100 Accounts Payable     │
//! │                      │   qty × unit cost    │   qty × unit cost         │
//! │  ────────────────────┼──────────────────────┼────────────────────────── │
//! │  Prescription / POS  │ 1100 Cash or         │ 4100 Revenue (net)        │
//! │  sale                │ 1150 Receivable      │ 2300 VAT Payable (vat)    │
//! │                      │   total              │   total = net + vat       │
//! │  ────────────────────┼──────────────────────┼────────────────────────── │
//! │  Payment received /  │ 1100 Cash or         │ 1150 Accounts Receivable  │
//! │  installment payment │ 1110 Bank (by method)│   amount                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## VAT Split
//! Sales totals are VAT-inclusive. `vat = total * rate / (100 + rate)`,
//! `revenue = total - vat`, so the entry balances to the cent.
//!
//! ## Missing Accounts
//! If a rule's account code is absent from the chart, the line is skipped
//! and its code reported in [`PostingOutcome::skipped_codes`] (default
//! policy, matching the system's historical behavior) or the whole event
//! fails with [`CoreError::MissingAccount`] under
//! [`MissingAccountPolicy::Fail`]. A skipped line can leave the entry
//! unbalanced; the lenient ledger will still store it. Callers wanting the
//! strict guarantee combine `Fail` with `BalancePolicy::Strict`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;
use crate::types::{
    AccountType, ChartOfAccounts, EntryStatus, JournalLine, ModuleSource, NewJournalEntry,
};

// =============================================================================
// Well-Known Account Codes
// =============================================================================

/// Account codes the posting rules resolve against the chart of accounts.
pub mod codes {
    /// Cash on hand.
    pub const CASH: &str = "1100";
    /// Bank deposits (transfers and card settlements land here).
    pub const BANK: &str = "1110";
    /// Accounts receivable.
    pub const RECEIVABLE: &str = "1150";
    /// Inventory at cost.
    pub const INVENTORY: &str = "1300";
    /// Accounts payable (supplier invoices).
    pub const PAYABLE: &str = "2100";
    /// VAT collected, owed to the tax authority.
    pub const VAT_PAYABLE: &str = "2300";
    /// Sales revenue, net of VAT.
    pub const REVENUE: &str = "4100";
}

/// The system accounts a fresh installation needs before it can post:
/// `(code, name, type)` triples consumed by the chart seeding routine.
pub fn default_account_specs() -> Vec<(&'static str, &'static str, AccountType)> {
    vec![
        (codes::CASH, "Cash", AccountType::Asset),
        (codes::BANK, "Bank", AccountType::Asset),
        (codes::RECEIVABLE, "Accounts Receivable", AccountType::Asset),
        (codes::INVENTORY, "Inventory", AccountType::Asset),
        (codes::PAYABLE, "Accounts Payable", AccountType::Liability),
        (codes::VAT_PAYABLE, "VAT Payable", AccountType::Liability),
        (codes::REVENUE, "Sales Revenue", AccountType::Revenue),
    ]
}

// =============================================================================
// Configuration
// =============================================================================

/// VAT configuration for sale events.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VatConfig {
    /// When false, sales post revenue for the full total with no VAT line.
    pub enabled: bool,
    /// Whole-percent VAT rate (10 = 10%).
    pub rate_percent: u32,
}

impl Default for VatConfig {
    fn default() -> Self {
        VatConfig {
            enabled: true,
            rate_percent: 10,
        }
    }
}

/// What to do when a rule's account code is missing from the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingAccountPolicy {
    /// Skip the line, report the code in the outcome. Historical behavior;
    /// can produce an unbalanced entry.
    #[default]
    SkipLine,
    /// Fail the whole event with [`CoreError::MissingAccount`].
    Fail,
}

// =============================================================================
// Business Events
// =============================================================================

/// How a sale settles at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// Paid immediately; debit cash.
    Cash,
    /// Billed; debit accounts receivable.
    Receivable,
}

/// A business event the rule engine knows how to post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusinessEvent {
    /// Stock arrived from a supplier.
    InventoryReceipt {
        reference: String,
        date: NaiveDate,
        quantity: i64,
        unit_cost: Money,
    },
    /// A prescription (frame + lens) sale.
    PrescriptionSale {
        reference: String,
        date: NaiveDate,
        total: Money,
        settlement: Settlement,
    },
    /// A walk-in POS sale.
    PosSale {
        reference: String,
        date: NaiveDate,
        total: Money,
        settlement: Settlement,
    },
    /// A payment received against an outstanding receivable.
    PaymentReceived {
        reference: String,
        date: NaiveDate,
        amount: Money,
        /// Free-form payment method ("cash", "bank transfer", "credit card").
        method: String,
    },
    /// One term of an installment plan paid off.
    InstallmentPayment {
        reference: String,
        date: NaiveDate,
        amount: Money,
        method: String,
        term_no: u32,
    },
}

impl BusinessEvent {
    /// Business date of the event (drives the accounting period).
    pub fn date(&self) -> NaiveDate {
        match self {
            BusinessEvent::InventoryReceipt { date, .. }
            | BusinessEvent::PrescriptionSale { date, .. }
            | BusinessEvent::PosSale { date, .. }
            | BusinessEvent::PaymentReceived { date, .. }
            | BusinessEvent::InstallmentPayment { date, .. } => *date,
        }
    }

    /// Source document reference.
    pub fn reference(&self) -> &str {
        match self {
            BusinessEvent::InventoryReceipt { reference, .. }
            | BusinessEvent::PrescriptionSale { reference, .. }
            | BusinessEvent::PosSale { reference, .. }
            | BusinessEvent::PaymentReceived { reference, .. }
            | BusinessEvent::InstallmentPayment { reference, .. } => reference,
        }
    }

    /// Monetary total the entry balances to.
    pub fn total(&self) -> Money {
        match self {
            BusinessEvent::InventoryReceipt {
                quantity, unit_cost, ..
            } => *unit_cost * *quantity,
            BusinessEvent::PrescriptionSale { total, .. }
            | BusinessEvent::PosSale { total, .. } => *total,
            BusinessEvent::PaymentReceived { amount, .. }
            | BusinessEvent::InstallmentPayment { amount, .. } => *amount,
        }
    }

    /// Which business process the resulting entry is tagged with.
    pub fn module_source(&self) -> ModuleSource {
        match self {
            BusinessEvent::InventoryReceipt { .. } => ModuleSource::Inventory,
            _ => ModuleSource::Sales,
        }
    }

    /// Human-readable description for the journal entry.
    pub fn description(&self) -> String {
        match self {
            BusinessEvent::InventoryReceipt { reference, .. } => {
                format!("Inventory receipt {reference}")
            }
            BusinessEvent::PrescriptionSale { reference, .. } => {
                format!("Prescription sale {reference}")
            }
            BusinessEvent::PosSale { reference, .. } => format!("POS sale {reference}"),
            BusinessEvent::PaymentReceived {
                reference, method, ..
            } => format!("Payment received ({method}) {reference}"),
            BusinessEvent::InstallmentPayment {
                reference,
                method,
                term_no,
                ..
            } => format!("Installment payment term {term_no} ({method}) {reference}"),
        }
    }
}

/// Routes a free-form payment method to a deposit account code.
///
/// Transfers and card settlements land in the bank account; anything
/// unrecognized defaults to cash.
pub fn deposit_account_code(method: &str) -> &'static str {
    let method = method.to_lowercase();
    if method.contains("transfer") || method.contains("bank") || method.contains("card") {
        codes::BANK
    } else {
        codes::CASH
    }
}

// =============================================================================
// The Rule Table
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Debit,
    Credit,
}

/// One row of the rule table: which account, which side, how much.
#[derive(Debug, Clone)]
struct LineSpec {
    code: &'static str,
    side: Side,
    amount: Money,
}

impl LineSpec {
    fn debit(code: &'static str, amount: Money) -> Self {
        LineSpec {
            code,
            side: Side::Debit,
            amount,
        }
    }

    fn credit(code: &'static str, amount: Money) -> Self {
        LineSpec {
            code,
            side: Side::Credit,
            amount,
        }
    }
}

/// The declarative event → lines mapping. Every formula lives here, in one
/// place, so the per-event math cannot drift apart.
fn line_specs_for(event: &BusinessEvent, vat: &VatConfig) -> Vec<LineSpec> {
    match event {
        BusinessEvent::InventoryReceipt { .. } => {
            let total = event.total();
            vec![
                LineSpec::debit(codes::INVENTORY, total),
                LineSpec::credit(codes::PAYABLE, total),
            ]
        }

        BusinessEvent::PrescriptionSale {
            total, settlement, ..
        }
        | BusinessEvent::PosSale {
            total, settlement, ..
        } => {
            let debit_code = match settlement {
                Settlement::Cash => codes::CASH,
                Settlement::Receivable => codes::RECEIVABLE,
            };
            let vat_amount = if vat.enabled {
                total.vat_portion(vat.rate_percent)
            } else {
                Money::zero()
            };
            let revenue = *total - vat_amount;

            let mut specs = vec![
                LineSpec::debit(debit_code, *total),
                LineSpec::credit(codes::REVENUE, revenue),
            ];
            if !vat_amount.is_zero() {
                specs.push(LineSpec::credit(codes::VAT_PAYABLE, vat_amount));
            }
            specs
        }

        BusinessEvent::PaymentReceived { amount, method, .. }
        | BusinessEvent::InstallmentPayment { amount, method, .. } => {
            vec![
                LineSpec::debit(deposit_account_code(method), *amount),
                LineSpec::credit(codes::RECEIVABLE, *amount),
            ]
        }
    }
}

// =============================================================================
// Posting Outcome
// =============================================================================

/// Result of building an entry from a business event.
#[derive(Debug, Clone)]
pub struct PostingOutcome {
    /// The entry ready for `JournalLedger::post`.
    pub entry: NewJournalEntry,
    /// Account codes whose lines were skipped because the chart is missing
    /// them. Non-empty means the entry may be unbalanced.
    pub skipped_codes: Vec<String>,
}

impl PostingOutcome {
    /// True when every rule line resolved against the chart.
    pub fn is_complete(&self) -> bool {
        self.skipped_codes.is_empty()
    }
}

/// Builds a journal entry for a business event.
///
/// Pure: resolves the rule table against the given chart snapshot and
/// returns the entry plus any skipped account codes. Never touches
/// storage.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use optica_core::money::Money;
/// use optica_core::posting::*;
/// use optica_core::types::{Account, AccountType, ChartOfAccounts};
///
/// let accounts = default_account_specs()
///     .into_iter()
///     .map(|(code, name, account_type)| Account {
///         id: format!("acc-{code}"),
///         code: code.to_string(),
///         name: name.to_string(),
///         account_type,
///         is_system: true,
///     })
///     .collect();
/// let chart = ChartOfAccounts::new(accounts);
///
/// let event = BusinessEvent::PosSale {
///     reference: "POS-1001".to_string(),
///     date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
///     total: Money::from_major(1100),
///     settlement: Settlement::Cash,
/// };
/// let outcome = build_entry(
///     &event,
///     &chart,
///     &VatConfig::default(),
///     MissingAccountPolicy::SkipLine,
/// )
/// .unwrap();
/// assert!(outcome.is_complete());
/// assert_eq!(outcome.entry.lines.len(), 3); // cash / revenue / VAT
/// ```
pub fn build_entry(
    event: &BusinessEvent,
    chart: &ChartOfAccounts,
    vat: &VatConfig,
    policy: MissingAccountPolicy,
) -> Result<PostingOutcome, CoreError> {
    let mut lines = Vec::new();
    let mut skipped_codes = Vec::new();

    for spec in line_specs_for(event, vat) {
        match chart.by_code(spec.code) {
            Some(account) => {
                let line = match spec.side {
                    Side::Debit => JournalLine::debit(account, spec.amount),
                    Side::Credit => JournalLine::credit(account, spec.amount),
                };
                lines.push(line);
            }
            None => match policy {
                MissingAccountPolicy::SkipLine => skipped_codes.push(spec.code.to_string()),
                MissingAccountPolicy::Fail => {
                    return Err(CoreError::MissingAccount {
                        code: spec.code.to_string(),
                    })
                }
            },
        }
    }

    let entry = NewJournalEntry {
        entry_date: event.date(),
        reference: event.reference().to_string(),
        description: event.description(),
        lines,
        total_amount: event.total(),
        status: EntryStatus::Posted,
        module_source: event.module_source(),
    };

    Ok(PostingOutcome {
        entry,
        skipped_codes,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Account;
    use crate::validation::is_balanced;

    fn full_chart() -> ChartOfAccounts {
        let accounts = default_account_specs()
            .into_iter()
            .map(|(code, name, account_type)| Account {
                id: format!("acc-{code}"),
                code: code.to_string(),
                name: name.to_string(),
                account_type,
                is_system: true,
            })
            .collect();
        ChartOfAccounts::new(accounts)
    }

    fn chart_without(missing: &str) -> ChartOfAccounts {
        let accounts = full_chart()
            .accounts()
            .iter()
            .filter(|a| a.code != missing)
            .cloned()
            .collect();
        ChartOfAccounts::new(accounts)
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn sample_events() -> Vec<BusinessEvent> {
        vec![
            BusinessEvent::InventoryReceipt {
                reference: "GRN-77".to_string(),
                date: march(2),
                quantity: 12,
                unit_cost: Money::from_major(45),
            },
            BusinessEvent::PrescriptionSale {
                reference: "RX-310".to_string(),
                date: march(5),
                total: Money::from_major(1100),
                settlement: Settlement::Receivable,
            },
            BusinessEvent::PosSale {
                reference: "POS-1001".to_string(),
                date: march(9),
                total: Money::from_cents(123_457),
                settlement: Settlement::Cash,
            },
            BusinessEvent::PaymentReceived {
                reference: "PAY-55".to_string(),
                date: march(12),
                amount: Money::from_major(600),
                method: "bank transfer".to_string(),
            },
            BusinessEvent::InstallmentPayment {
                reference: "INST-9".to_string(),
                date: march(20),
                amount: Money::from_major(200),
                method: "credit card".to_string(),
                term_no: 3,
            },
        ]
    }

    /// Core property: every engine-built entry balances when the chart
    /// resolves every code, VAT rounding included.
    #[test]
    fn test_all_events_balance() {
        let chart = full_chart();
        for event in sample_events() {
            let outcome = build_entry(
                &event,
                &chart,
                &VatConfig::default(),
                MissingAccountPolicy::SkipLine,
            )
            .unwrap();
            assert!(outcome.is_complete(), "event skipped lines: {event:?}");
            assert!(is_balanced(&outcome.entry.lines), "unbalanced: {event:?}");
        }
    }

    #[test]
    fn test_inventory_receipt_amount() {
        let chart = full_chart();
        let event = BusinessEvent::InventoryReceipt {
            reference: "GRN-1".to_string(),
            date: march(2),
            quantity: 12,
            unit_cost: Money::from_major(45),
        };
        let outcome = build_entry(
            &event,
            &chart,
            &VatConfig::default(),
            MissingAccountPolicy::SkipLine,
        )
        .unwrap();

        assert_eq!(outcome.entry.total_amount, Money::from_major(540));
        assert_eq!(outcome.entry.module_source, ModuleSource::Inventory);
        assert_eq!(outcome.entry.lines.len(), 2);
        assert_eq!(outcome.entry.lines[0].debit, Money::from_major(540));
    }

    #[test]
    fn test_sale_vat_split() {
        let chart = full_chart();
        let event = BusinessEvent::PosSale {
            reference: "POS-1".to_string(),
            date: march(9),
            total: Money::from_major(1100),
            settlement: Settlement::Cash,
        };
        let outcome = build_entry(
            &event,
            &chart,
            &VatConfig::default(),
            MissingAccountPolicy::SkipLine,
        )
        .unwrap();

        // cash 1100 / revenue 1000 / VAT 100
        assert_eq!(outcome.entry.lines.len(), 3);
        assert_eq!(outcome.entry.lines[0].debit, Money::from_major(1100));
        assert_eq!(outcome.entry.lines[1].credit, Money::from_major(1000));
        assert_eq!(outcome.entry.lines[2].credit, Money::from_major(100));
    }

    #[test]
    fn test_sale_without_vat() {
        let chart = full_chart();
        let event = BusinessEvent::PrescriptionSale {
            reference: "RX-2".to_string(),
            date: march(5),
            total: Money::from_major(500),
            settlement: Settlement::Cash,
        };
        let vat = VatConfig {
            enabled: false,
            rate_percent: 10,
        };
        let outcome =
            build_entry(&event, &chart, &vat, MissingAccountPolicy::SkipLine).unwrap();

        assert_eq!(outcome.entry.lines.len(), 2);
        assert_eq!(outcome.entry.lines[1].credit, Money::from_major(500));
        assert!(is_balanced(&outcome.entry.lines));
    }

    #[test]
    fn test_receivable_sale_debits_receivable() {
        let chart = full_chart();
        let event = BusinessEvent::PrescriptionSale {
            reference: "RX-3".to_string(),
            date: march(5),
            total: Money::from_major(880),
            settlement: Settlement::Receivable,
        };
        let outcome = build_entry(
            &event,
            &chart,
            &VatConfig::default(),
            MissingAccountPolicy::SkipLine,
        )
        .unwrap();
        assert_eq!(outcome.entry.lines[0].account_id, "acc-1150");
    }

    #[test]
    fn test_payment_method_routing() {
        assert_eq!(deposit_account_code("cash"), codes::CASH);
        assert_eq!(deposit_account_code("Bank Transfer"), codes::BANK);
        assert_eq!(deposit_account_code("CREDIT CARD"), codes::BANK);
        assert_eq!(deposit_account_code("gift voucher"), codes::CASH);
    }

    #[test]
    fn test_installment_description_carries_term() {
        let chart = full_chart();
        let event = BusinessEvent::InstallmentPayment {
            reference: "INST-9".to_string(),
            date: march(20),
            amount: Money::from_major(200),
            method: "card".to_string(),
            term_no: 3,
        };
        let outcome = build_entry(
            &event,
            &chart,
            &VatConfig::default(),
            MissingAccountPolicy::SkipLine,
        )
        .unwrap();
        assert!(outcome.entry.description.contains("term 3"));
        assert_eq!(outcome.entry.lines[0].account_id, "acc-1110");
    }

    /// Historical behavior: missing chart account skips the line instead
    /// of failing, which can leave the entry unbalanced. The outcome
    /// reports the skipped code so callers can decide what to do.
    #[test]
    fn test_missing_account_skip_policy() {
        let chart = chart_without(codes::VAT_PAYABLE);
        let event = BusinessEvent::PosSale {
            reference: "POS-1".to_string(),
            date: march(9),
            total: Money::from_major(1100),
            settlement: Settlement::Cash,
        };
        let outcome = build_entry(
            &event,
            &chart,
            &VatConfig::default(),
            MissingAccountPolicy::SkipLine,
        )
        .unwrap();

        assert_eq!(outcome.skipped_codes, vec![codes::VAT_PAYABLE.to_string()]);
        assert!(!outcome.is_complete());
        assert!(!is_balanced(&outcome.entry.lines));
    }

    #[test]
    fn test_missing_account_fail_policy() {
        let chart = chart_without(codes::REVENUE);
        let event = BusinessEvent::PosSale {
            reference: "POS-1".to_string(),
            date: march(9),
            total: Money::from_major(100),
            settlement: Settlement::Cash,
        };
        let err = build_entry(
            &event,
            &chart,
            &VatConfig::default(),
            MissingAccountPolicy::Fail,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::MissingAccount { code } if code == codes::REVENUE));
    }
}
