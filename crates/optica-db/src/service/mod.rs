//! # Ledger Services
//!
//! The operation layer of the back-office ledger. Repositories do raw
//! table CRUD; the services here add the business rules around them:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JournalLedger        post / update / delete journal entries            │
//! │                       (period-lock gate on post, audit stamps)          │
//! │  PeriodLockManager    close / reopen accounting months                  │
//! │  PointLedger          atomic balance adjustment + history append        │
//! │  RecalculationEngine  replay spend, batch-correct drifted balances      │
//! │  PromotionService     quote applicable discounts for a sale             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every service is a cheap clone over the shared pool; grab one from
//! [`crate::pool::Database`] per operation.

pub mod journal;
pub mod periods;
pub mod points;
pub mod promotions;
pub mod recalc;
