//! Staff account types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loyalty_core::{StaffId, StaffRole};

/// A staff account. The password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub location: String,
    pub role: StaffRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new staff account, with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub name: String,
    pub password_hash: String,
    pub location: String,
    pub role: StaffRole,
}

/// Editable staff fields.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffUpdate {
    pub name: String,
    pub location: String,
    pub role: StaffRole,
}
