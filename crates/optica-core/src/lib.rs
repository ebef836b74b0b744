//! # optica-core: Pure Ledger Logic for the Optica Back-Office
//!
//! This crate is the **heart** of the back-office ledger engine. It contains
//! all bookkeeping logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Optica Back-Office Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Business Event Handlers / UI Actions              │   │
//! │  │   receive_stock ──► sell ──► take_payment ──► close_month       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ optica-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │  posting  │  │  recalc   │  │ promotion │   │   │
//! │  │   │  Account  │  │ rule table│  │  replay   │  │  tiers    │   │   │
//! │  │   │  Journal  │  │ VAT split │  │  plans    │  │ discounts │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    optica-db (Storage Layer)                    │   │
//! │  │        SQLite repositories, services, audit trail               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Account, JournalEntry, PointTransaction, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Double-entry balance validation
//! - [`posting`] - Auto-posting rule engine (business event → journal lines)
//! - [`recalc`] - Point recalculation planner (replay of spend history)
//! - [`promotion`] - Promotion discount calculator and customer tiers
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//! 5. **Snapshots In, Plans Out**: functions take explicit snapshots of the
//!    ledger state and return the writes the storage layer should perform
//!
//! ## Example Usage
//!
//! ```rust
//! use optica_core::money::Money;
//! use optica_core::recalc::earned_points;
//!
//! // A 1,000.00 purchase at earn rate 25 yields 40 loyalty points
//! let spend = Money::from_major(1000);
//! assert_eq!(earned_points(spend, 25), 40);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod posting;
pub mod promotion;
pub mod recalc;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use optica_core::Money` instead of
// `use optica_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Balance tolerance for double-entry validation, in cents.
///
/// ## Why One Cent?
/// The ledger accepts entries whose debit and credit totals differ by at
/// most 0.01 currency units. With integer-cent arithmetic that is exactly
/// one cent, so rounding residue from a VAT split can never reject an
/// otherwise correct entry.
pub const BALANCE_TOLERANCE_CENTS: i64 = 1;

/// Default loyalty earn rate: spend-per-point in whole currency units.
///
/// ## Business Reason
/// One point for every 25.00 spent. Stores can override this per
/// installation; the recalculation engine takes the rate as input.
pub const DEFAULT_EARN_RATE: i64 = 25;
