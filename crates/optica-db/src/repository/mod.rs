//! # Repository Module
//!
//! Database repository implementations for the Optica back-office ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Ledger Service                                                        │
//! │       │                                                                 │
//! │       │  periods.find(2026, 3)                                         │
//! │       ▼                                                                 │
//! │  PeriodRepository                                                      │
//! │  ├── find(&self, year, month)                                          │
//! │  ├── insert(&self, period)                                             │
//! │  └── delete(&self, year, month)                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place per table                              │
//! │  • Services compose repositories with domain rules on top              │
//! │  • Easy to exercise against an in-memory database in tests            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`accounts::AccountRepository`] - Chart of accounts lookup and seeding
//! - [`journal::JournalEntryRepository`] - Journal entry CRUD
//! - [`periods::PeriodRepository`] - Month lock records
//! - [`points::PointRepository`] - Balances and point history
//! - [`history::SpendHistoryRepository`] - Ground-truth spend (read side)
//! - [`promotions::PromotionRepository`] - Configured promotions
//! - [`audit::AuditLogRepository`] - Audit trail

pub mod accounts;
pub mod audit;
pub mod history;
pub mod journal;
pub mod periods;
pub mod points;
pub mod promotions;
