//! Loyalty Core - Shared domain types and rules.
//!
//! This crate provides the types used across the loyalty workspace:
//! - `server` - HTTP API and ledger service
//! - `cli` - Command-line tools for migrations and staff bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. The points accrual rule lives here so that it can be
//! exercised without a store.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, external user identifiers, coupon tokens,
//!   statuses and the points accrual rule

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
