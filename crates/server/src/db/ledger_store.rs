//! `PostgreSQL` implementation of [`LedgerStore`].

use sqlx::PgPool;

use loyalty_core::{
    CouponStatus, CouponToken, ExternalId, Points, PromotionId, TransactionId, UserId,
};

use super::{RepositoryError, TransactionRepository, UserRepository, promotions, transactions};
use crate::ledger::{LedgerStore, RedemptionCommit, RedemptionOutcome};
use crate::models::{NewTransaction, NewUser, Promotion, User};

/// Ledger store backed by the `loyalty` schema.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Create a store on an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LedgerStore for PgLedgerStore {
    async fn sum_points_for_user(&self, user: &ExternalId) -> Result<i64, RepositoryError> {
        TransactionRepository::new(&self.pool).balance(user).await
    }

    async fn get_promotion(&self, id: PromotionId) -> Result<Option<Promotion>, RepositoryError> {
        Ok(promotions::fetch(&self.pool, id).await?)
    }

    async fn commit_redemption(
        &self,
        commit: RedemptionCommit,
    ) -> Result<RedemptionOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Serializes redemptions by the same member so two commits cannot
        // both pass the balance check below.
        let locked = sqlx::query_scalar::<_, UserId>(
            "SELECT id FROM loyalty.users WHERE external_id = $1 FOR UPDATE",
        )
        .bind(&commit.user)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        let cost = sqlx::query_scalar::<_, i64>(
            r"
            UPDATE loyalty.promotions
            SET quantity = quantity - 1, updated_at = NOW()
            WHERE id = $1
              AND quantity > 0
              AND $2::DATE BETWEEN start_date AND end_date
            RETURNING points_needed
            ",
        )
        .bind(commit.promotion_id)
        .bind(commit.occurred_at.date_naive())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(cost) = cost else {
            tx.rollback().await?;
            return Ok(RedemptionOutcome::Exhausted);
        };

        let balance = transactions::sum_points(&mut *tx, &commit.user).await?;
        if balance < cost {
            tx.rollback().await?;
            return Ok(RedemptionOutcome::InsufficientPoints {
                balance,
                required: cost,
            });
        }

        let points_spent = Points::new(cost);
        let entry = NewTransaction::redemption(
            commit.user,
            commit.branch,
            commit.promotion_id,
            commit.coupon,
            points_spent,
            commit.occurred_at,
        );
        let transaction_id = transactions::insert(&mut *tx, &entry).await?;
        tx.commit().await?;

        Ok(RedemptionOutcome::Committed {
            transaction_id,
            points_spent,
            balance_after: balance - cost,
        })
    }

    async fn insert_transaction(
        &self,
        entry: NewTransaction,
    ) -> Result<TransactionId, RepositoryError> {
        Ok(transactions::insert(&self.pool, &entry).await?)
    }

    async fn find_user_by_external_id(
        &self,
        user: &ExternalId,
    ) -> Result<Option<User>, RepositoryError> {
        UserRepository::new(&self.pool).get_by_external_id(user).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserId, RepositoryError> {
        let user = UserRepository::new(&self.pool).create(&user).await?;
        Ok(user.id)
    }

    async fn get_coupon_status(
        &self,
        token: CouponToken,
    ) -> Result<Option<CouponStatus>, RepositoryError> {
        TransactionRepository::new(&self.pool)
            .coupon_status(token)
            .await
    }

    async fn set_coupon_status(
        &self,
        token: CouponToken,
        expected: CouponStatus,
        new: CouponStatus,
        location: &str,
    ) -> Result<u64, RepositoryError> {
        TransactionRepository::new(&self.pool)
            .transition_coupon(token, expected, new, location)
            .await
    }
}
