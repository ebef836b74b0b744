//! # optica-db: Storage and Services for the Optica Back-Office Ledger
//!
//! This crate provides database access and the ledger operation layer.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Optica Back-Office Data Flow                        │
//! │                                                                         │
//! │  UI Action (post entry, close month, recalculate points)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     optica-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Services    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ JournalLedger │    │ JournalRepo   │    │  (embedded)  │  │   │
//! │  │   │ PointLedger   │───►│ PointRepo     │    │ 001_init.sql │  │   │
//! │  │   │ RecalcEngine  │    │ PeriodRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  └────────────────────────────────┼───────────────────────────────┘   │
//! │                                   ▼                                    │
//! │                          SQLite (optica.db)                            │
//! │                                   ▲                                    │
//! │              pure domain logic: optica-core (no I/O)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and ledger error types
//! - [`repository`] - One repository per table
//! - [`service`] - Ledger operations (lock checks, batches, audit)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use optica_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/optica.db")).await?;
//! db.accounts().ensure_default_accounts().await?;
//!
//! let id = db.journal_ledger().post(entry, "admin").await?;
//! db.period_locks().close(2026, 3, "admin").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, LedgerError};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::accounts::AccountRepository;
pub use repository::audit::AuditLogRepository;
pub use repository::history::SpendHistoryRepository;
pub use repository::journal::JournalEntryRepository;
pub use repository::periods::PeriodRepository;
pub use repository::points::PointRepository;
pub use repository::promotions::PromotionRepository;

// Service re-exports
pub use service::journal::{BalancePolicy, JournalLedger};
pub use service::periods::PeriodLockManager;
pub use service::points::PointLedger;
pub use service::promotions::PromotionService;
pub use service::recalc::RecalculationEngine;
