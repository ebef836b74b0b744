//! # Error Types
//!
//! Domain-specific error types for optica-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  optica-core errors (this file)                                        │
//! │  ├── CoreError        - Ledger rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  optica-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── LedgerError      - CoreError ∪ DbError, returned by services      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError → caller/UI           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (period, account code, totals)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations.
///
/// These errors represent bookkeeping rule violations. They should be
/// caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The accounting period for the entry's date is closed.
    ///
    /// ## When This Occurs
    /// - Posting a journal entry dated inside a locked (year, month)
    ///
    /// ## User Workflow
    /// ```text
    /// Post entry dated 2026-03-15
    ///      │
    ///      ▼
    /// Period lock lookup: 2026-03 closed
    ///      │
    ///      ▼
    /// PeriodLocked { year: 2026, month: 3 }
    ///      │
    ///      ▼
    /// UI shows: "March 2026 is closed - reopen it before posting"
    /// ```
    #[error("Accounting period {year}-{month:02} is locked")]
    PeriodLocked { year: i32, month: u32 },

    /// Debit and credit totals do not balance.
    ///
    /// ## When This Occurs
    /// Only raised when the Journal Ledger runs with the strict balance
    /// policy. The lenient (default) policy leaves balance checking to
    /// callers, matching the historical behavior of this system.
    #[error("Journal entry is unbalanced: debits {debits} != credits {credits}")]
    UnbalancedEntry { debits: Money, credits: Money },

    /// A required Chart-of-Accounts code is absent.
    ///
    /// ## When This Occurs
    /// Only raised under [`MissingAccountPolicy::Fail`]. The default
    /// policy skips the line instead and reports the skipped codes in
    /// the posting outcome.
    ///
    /// [`MissingAccountPolicy::Fail`]: crate::posting::MissingAccountPolicy
    #[error("Account not found in chart of accounts: {code}")]
    MissingAccount { code: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before ledger logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unknown enum tag, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_locked_message() {
        let err = CoreError::PeriodLocked {
            year: 2026,
            month: 3,
        };
        assert_eq!(err.to_string(), "Accounting period 2026-03 is locked");
    }

    #[test]
    fn test_unbalanced_message() {
        let err = CoreError::UnbalancedEntry {
            debits: Money::from_cents(10000),
            credits: Money::from_cents(9900),
        };
        assert_eq!(
            err.to_string(),
            "Journal entry is unbalanced: debits $100.00 != credits $99.00"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "lines".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
