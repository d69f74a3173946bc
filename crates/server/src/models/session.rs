//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use loyalty_core::{StaffId, StaffRole};

use super::Staff;

/// Session-stored staff identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentStaff {
    pub id: StaffId,
    pub name: String,
    pub location: String,
    pub role: StaffRole,
}

impl From<&Staff> for CurrentStaff {
    fn from(staff: &Staff) -> Self {
        Self {
            id: staff.id,
            name: staff.name.clone(),
            location: staff.location.clone(),
            role: staff.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the logged-in staff member.
    pub const CURRENT_STAFF: &str = "current_staff";
}
