//! Storage contract for the ledger.

use std::future::Future;

use chrono::{DateTime, Utc};

use loyalty_core::{
    CouponStatus, CouponToken, ExternalId, Points, PromotionId, TransactionId, UserId,
};

use crate::db::RepositoryError;
use crate::models::{NewTransaction, NewUser, Promotion, User};

/// Everything needed to commit a validated redemption.
#[derive(Debug, Clone)]
pub struct RedemptionCommit {
    pub user: ExternalId,
    pub promotion_id: PromotionId,
    pub branch: String,
    pub coupon: CouponToken,
    pub occurred_at: DateTime<Utc>,
}

/// Result of the atomic redemption unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionOutcome {
    /// Stock decremented and the redeem entry appended.
    Committed {
        transaction_id: TransactionId,
        points_spent: Points,
        balance_after: i64,
    },
    /// The promotion had no stock left, was outside its validity window or
    /// vanished. Nothing written.
    Exhausted,
    /// The balance no longer covers the cost. Nothing written.
    InsufficientPoints { balance: i64, required: i64 },
}

/// Persistence collaborator for [`super::LedgerService`].
///
/// `commit_redemption` must be atomic: the conditional stock decrement (which
/// also re-checks the validity window), the balance re-check and the insert either all happen or none do, and two
/// concurrent commits against the last unit of stock cannot both succeed.
/// `set_coupon_status` is a compare-and-set on the current status.
pub trait LedgerStore: Send + Sync {
    fn sum_points_for_user(
        &self,
        user: &ExternalId,
    ) -> impl Future<Output = Result<i64, RepositoryError>> + Send;

    fn get_promotion(
        &self,
        id: PromotionId,
    ) -> impl Future<Output = Result<Option<Promotion>, RepositoryError>> + Send;

    fn commit_redemption(
        &self,
        commit: RedemptionCommit,
    ) -> impl Future<Output = Result<RedemptionOutcome, RepositoryError>> + Send;

    fn insert_transaction(
        &self,
        entry: NewTransaction,
    ) -> impl Future<Output = Result<TransactionId, RepositoryError>> + Send;

    fn find_user_by_external_id(
        &self,
        user: &ExternalId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Insert a member. A taken external id is `RepositoryError::Conflict`.
    fn insert_user(
        &self,
        user: NewUser,
    ) -> impl Future<Output = Result<UserId, RepositoryError>> + Send;

    fn get_coupon_status(
        &self,
        token: CouponToken,
    ) -> impl Future<Output = Result<Option<CouponStatus>, RepositoryError>> + Send;

    /// Move a coupon from `expected` to `new`. Returns the number of coupons changed.
    fn set_coupon_status(
        &self,
        token: CouponToken,
        expected: CouponStatus,
        new: CouponStatus,
        location: &str,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;
}
