//! Core types for the loyalty ledger.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coupon;
pub mod external_id;
pub mod id;
pub mod points;
pub mod status;

pub use coupon::CouponToken;
pub use external_id::{ExternalId, ExternalIdError};
pub use id::*;
pub use points::{MAX_SPENDING_AMOUNT, POINTS_RATE, Points, PointsError, SpendingAmount};
pub use status::*;
