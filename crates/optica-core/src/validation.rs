//! # Validation Module
//!
//! Double-entry balance validation and input checks.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Caller (event handlers, manual-entry forms)                  │
//! │  ├── Builds balanced lines via the posting engine                      │
//! │  └── Historically the ONLY place balance was checked                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (opt-in at the ledger boundary)                  │
//! │  ├── validate_balanced: Σdebit == Σcredit within one cent              │
//! │  └── Only enforced under BalancePolicy::Strict                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  └── NOT NULL / UNIQUE / FK constraints only, no balance check         │
//! │                                                                         │
//! │  The lenient default keeps the ledger a passive store, matching the    │
//! │  system's historical behavior; Strict is the safer superset.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::types::JournalLine;
use crate::BALANCE_TOLERANCE_CENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Balance Validation
// =============================================================================

/// Sums the debit and credit columns of a set of journal lines.
pub fn entry_totals(lines: &[JournalLine]) -> (Money, Money) {
    let debits: Money = lines.iter().map(|l| l.debit).sum();
    let credits: Money = lines.iter().map(|l| l.credit).sum();
    (debits, credits)
}

/// Checks the double-entry invariant: `Σdebit == Σcredit` within one cent.
pub fn is_balanced(lines: &[JournalLine]) -> bool {
    let (debits, credits) = entry_totals(lines);
    (debits.cents() - credits.cents()).abs() <= BALANCE_TOLERANCE_CENTS
}

/// Validates that an entry has lines and that they balance.
///
/// Used by the Journal Ledger under the strict balance policy.
pub fn validate_balanced(lines: &[JournalLine]) -> Result<(), CoreError> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        }
        .into());
    }

    let (debits, credits) = entry_totals(lines);
    if (debits.cents() - credits.cents()).abs() > BALANCE_TOLERANCE_CENTS {
        return Err(CoreError::UnbalancedEntry { debits, credits });
    }

    Ok(())
}

// =============================================================================
// Input Validators
// =============================================================================

/// Validates a calendar month number (1..=12).
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }
    Ok(())
}

/// Validates a loyalty earn rate (spend-per-point, must be positive).
pub fn validate_earn_rate(rate: i64) -> ValidationResult<()> {
    if rate <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "earn_rate".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Account, AccountType};

    fn account(code: &str) -> Account {
        Account {
            id: format!("acc-{code}"),
            code: code.to_string(),
            name: format!("Account {code}"),
            account_type: AccountType::Asset,
            is_system: true,
        }
    }

    fn balanced_lines(amount: Money) -> Vec<JournalLine> {
        vec![
            JournalLine::debit(&account("1100"), amount),
            JournalLine::credit(&account("4100"), amount),
        ]
    }

    #[test]
    fn test_balanced_lines_pass() {
        let lines = balanced_lines(Money::from_major(100));
        assert!(is_balanced(&lines));
        assert!(validate_balanced(&lines).is_ok());
    }

    #[test]
    fn test_one_cent_residue_tolerated() {
        let mut lines = balanced_lines(Money::from_cents(10_000));
        lines[1].credit = Money::from_cents(10_001);
        assert!(is_balanced(&lines));
    }

    #[test]
    fn test_unbalanced_lines_rejected() {
        let mut lines = balanced_lines(Money::from_major(100));
        lines[1].credit = Money::from_major(99);
        assert!(!is_balanced(&lines));

        let err = validate_balanced(&lines).unwrap_err();
        assert!(matches!(err, CoreError::UnbalancedEntry { .. }));
    }

    #[test]
    fn test_empty_lines_rejected() {
        let err = validate_balanced(&[]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
    }

    #[test]
    fn test_validate_earn_rate() {
        assert!(validate_earn_rate(25).is_ok());
        assert!(validate_earn_rate(0).is_err());
        assert!(validate_earn_rate(-5).is_err());
    }
}
