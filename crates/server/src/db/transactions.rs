//! Ledger repository.
//!
//! The ledger is append-only: there is no update or delete for entries
//! beyond the coupon status transition.

use sqlx::{PgExecutor, PgPool};

use loyalty_core::{CouponStatus, CouponToken, ExternalId, TransactionId};

use super::RepositoryError;
use crate::models::{CouponDetails, NewTransaction, Transaction, UserCoupon};

/// Balance of a member: the sum of every point delta.
pub(crate) async fn sum_points<'e, E>(executor: E, user: &ExternalId) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        r"
        SELECT COALESCE(SUM(points), 0)::BIGINT
        FROM loyalty.transactions
        WHERE user_external_id = $1
        ",
    )
    .bind(user)
    .fetch_one(executor)
    .await
}

/// Append one entry and return its ID.
pub(crate) async fn insert<'e, E>(
    executor: E,
    entry: &NewTransaction,
) -> Result<TransactionId, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, TransactionId>(
        r"
        INSERT INTO loyalty.transactions (
            user_external_id, kind, occurred_at, branch, receipt_no, receipt_photo_url,
            spending_value, points, promotion_id, coupon_id, status, details
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING id
        ",
    )
    .bind(&entry.user_external_id)
    .bind(entry.kind)
    .bind(entry.occurred_at)
    .bind(&entry.branch)
    .bind(&entry.receipt_no)
    .bind(&entry.receipt_photo_url)
    .bind(entry.spending_value)
    .bind(entry.points.value())
    .bind(entry.promotion_id)
    .bind(entry.coupon_id)
    .bind(entry.status)
    .bind(&entry.details)
    .fetch_one(executor)
    .await
}

/// Repository for ledger reads and the coupon transition.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every ledger entry, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Transaction>, RepositoryError> {
        let entries = sqlx::query_as::<_, Transaction>(
            r"
            SELECT id, user_external_id, kind, occurred_at, branch, receipt_no,
                   receipt_photo_url, spending_value, points, promotion_id, coupon_id,
                   status, use_location, used_at, details
            FROM loyalty.transactions
            ORDER BY occurred_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    /// Ledger entries of one member, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user: &ExternalId,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let entries = sqlx::query_as::<_, Transaction>(
            r"
            SELECT id, user_external_id, kind, occurred_at, branch, receipt_no,
                   receipt_photo_url, spending_value, points, promotion_id, coupon_id,
                   status, use_location, used_at, details
            FROM loyalty.transactions
            WHERE user_external_id = $1
            ORDER BY occurred_at DESC, id DESC
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    /// Current balance of a member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn balance(&self, user: &ExternalId) -> Result<i64, RepositoryError> {
        Ok(sum_points(self.pool, user).await?)
    }

    /// Every coupon a member holds, with its promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn coupons_for_user(
        &self,
        user: &ExternalId,
    ) -> Result<Vec<UserCoupon>, RepositoryError> {
        let coupons = sqlx::query_as::<_, UserCoupon>(
            r"
            SELECT t.coupon_id, t.status, t.use_location, t.occurred_at AS redeemed_at,
                   p.id AS promotion_id, p.name AS promotion_name, p.description,
                   p.points_needed, p.start_date, p.end_date, p.image_url
            FROM loyalty.transactions t
            JOIN loyalty.promotions p ON p.id = t.promotion_id
            WHERE t.user_external_id = $1 AND t.kind = 'redeem'
            ORDER BY t.occurred_at DESC, t.id DESC
            ",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(coupons)
    }

    /// Coupon as shown to staff: owner and promotion names.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn coupon_details(
        &self,
        token: CouponToken,
    ) -> Result<Option<CouponDetails>, RepositoryError> {
        let details = sqlx::query_as::<_, CouponDetails>(
            r"
            SELECT t.coupon_id, t.status, u.name AS user_name,
                   p.name AS promotion_name, t.use_location
            FROM loyalty.transactions t
            JOIN loyalty.users u ON u.external_id = t.user_external_id
            JOIN loyalty.promotions p ON p.id = t.promotion_id
            WHERE t.coupon_id = $1
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(details)
    }

    /// Status of a coupon, `None` if the token is unknown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn coupon_status(
        &self,
        token: CouponToken,
    ) -> Result<Option<CouponStatus>, RepositoryError> {
        let status = sqlx::query_scalar::<_, CouponStatus>(
            "SELECT status FROM loyalty.transactions WHERE coupon_id = $1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(status)
    }

    /// Move a coupon from `expected` to `new`, returning the affected row count.
    ///
    /// Zero means the coupon is unknown or no longer in `expected`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn transition_coupon(
        &self,
        token: CouponToken,
        expected: CouponStatus,
        new: CouponStatus,
        location: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE loyalty.transactions
            SET status = $3, use_location = $4, used_at = NOW()
            WHERE coupon_id = $1 AND status = $2
            ",
        )
        .bind(token)
        .bind(expected)
        .bind(new)
        .bind(location)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
