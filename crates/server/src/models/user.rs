//! Loyalty member types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use loyalty_core::{ExternalId, UserId};

/// A registered loyalty member.
///
/// The point balance is not a column; it is always derived from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    /// Internal row ID.
    pub id: UserId,
    /// Identifier chosen at registration, immutable afterwards.
    pub external_id: ExternalId,
    pub name: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a member.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: ExternalId,
    pub name: String,
    pub phone: String,
}

/// Lifetime totals for a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    /// Sum of all spending amounts.
    pub total_spending: Decimal,
    /// Current balance (sum of all point deltas).
    pub total_points: i64,
}
