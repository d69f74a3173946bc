//! Ledger error types.

use thiserror::Error;

use loyalty_core::{CouponStatus, ExternalIdError, PointsError};

use crate::db::RepositoryError;

/// Errors returned by ledger operations.
///
/// Everything except `Store` is an expected outcome of a well-formed request.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The spending amount was rejected.
    #[error("invalid spending amount: {0}")]
    InvalidAmount(#[from] PointsError),

    #[error("user not registered")]
    UserNotFound,

    #[error("promotion not found")]
    PromotionNotFound,

    #[error("coupon not found")]
    CouponNotFound,

    #[error("user already registered")]
    DuplicateUser,

    #[error("insufficient points: balance {balance}, required {required}")]
    InsufficientPoints { balance: i64, required: i64 },

    /// Sold out, outside its validity window, or unknown.
    #[error("promotion unavailable")]
    PromotionUnavailable,

    #[error("coupon is not valid (status: {status})")]
    CouponNotValid { status: CouponStatus },

    /// The user has ledger entries and cannot be removed.
    #[error("user has transaction history")]
    UserHasHistory,

    /// Redemptions reference the promotion.
    #[error("promotion has redemptions")]
    PromotionInUse,

    /// Storage failed. The only class that is a server fault.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

impl From<ExternalIdError> for LedgerError {
    fn from(err: ExternalIdError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl LedgerError {
    /// Whether this error is a server fault rather than a rejected request.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
