//! Business logic services outside the ledger.
//!
//! - `auth` - Staff registration and password login

pub mod auth;

pub use auth::{AuthError, StaffAuthService, StaffRegistration};
