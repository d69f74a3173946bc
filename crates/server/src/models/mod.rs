//! Domain models for the loyalty ledger.
//!
//! Row types are decoded with `sqlx::FromRow` and serialized directly
//! into API responses.

pub mod promotion;
pub mod session;
pub mod staff;
pub mod transaction;
pub mod user;

pub use promotion::{Promotion, PromotionInput};
pub use session::{CurrentStaff, keys as session_keys};
pub use staff::{NewStaff, Staff, StaffUpdate};
pub use transaction::{CouponDetails, NewTransaction, Transaction, UserCoupon};
pub use user::{NewUser, User, UserSummary};
