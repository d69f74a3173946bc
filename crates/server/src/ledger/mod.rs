//! Loyalty ledger business logic.
//!
//! `LedgerService` owns the accrual, redemption, coupon and registration
//! rules and talks to storage only through the [`LedgerStore`] trait, so the
//! same logic runs against `PostgreSQL` ([`crate::db::PgLedgerStore`]) and
//! the in-process [`MemoryStore`].

mod error;
pub mod memory;
pub mod service;
pub mod store;

pub use error::LedgerError;
pub use memory::MemoryStore;
pub use service::{
    LedgerService, NewSpending, Redemption, RedemptionRequest, RegisterUser, RegisteredUser,
    SpendingReceipt,
};
pub use store::{LedgerStore, RedemptionCommit, RedemptionOutcome};
