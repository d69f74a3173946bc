//! Ledger service: accrual, redemption, coupon use and registration.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use loyalty_core::{
    CouponStatus, CouponToken, ExternalId, PromotionId, SpendingAmount, TransactionId, UserId,
};

use super::error::LedgerError;
use super::store::{LedgerStore, RedemptionCommit, RedemptionOutcome};
use crate::db::RepositoryError;
use crate::models::{NewTransaction, NewUser};

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub user_id: String,
    pub name: String,
    pub phone: String,
}

/// A freshly registered member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredUser {
    pub id: UserId,
    pub user_id: ExternalId,
    pub name: String,
    pub phone: String,
}

/// A purchase to record against a member.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSpending {
    pub user_id: String,
    pub branch: String,
    pub receipt_no: String,
    #[serde(default)]
    pub receipt_photo_url: Option<String>,
    pub spending_value: Option<Decimal>,
    /// When the purchase happened. Defaults to now.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Result of recording a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpendingReceipt {
    pub transaction_id: TransactionId,
    pub points: i64,
}

/// A member asking to redeem a promotion.
#[derive(Debug, Clone, Deserialize)]
pub struct RedemptionRequest {
    pub user_id: String,
    pub promotion_id: PromotionId,
    pub branch: String,
}

/// A committed redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Redemption {
    pub coupon_id: CouponToken,
    pub transaction_id: TransactionId,
    pub points_spent: i64,
    pub balance: i64,
}

/// Ledger operations over any [`LedgerStore`].
#[derive(Debug, Clone)]
pub struct LedgerService<S> {
    store: S,
}

impl<S: LedgerStore> LedgerService<S> {
    /// Create a service backed by `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Register a member under a new external id.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for missing fields and
    /// `LedgerError::DuplicateUser` if the external id is taken, including
    /// when a concurrent registration wins the race.
    #[instrument(skip(self, request), fields(user = %request.user_id))]
    pub async fn register_user(&self, request: RegisterUser) -> Result<RegisteredUser, LedgerError> {
        let external_id = ExternalId::parse(&request.user_id)?;
        let name = required("name", &request.name)?;
        let phone = required("phone", &request.phone)?;

        if self
            .store
            .find_user_by_external_id(&external_id)
            .await?
            .is_some()
        {
            return Err(LedgerError::DuplicateUser);
        }

        let user = NewUser {
            external_id,
            name,
            phone,
        };
        let id = match self.store.insert_user(user.clone()).await {
            Ok(id) => id,
            Err(RepositoryError::Conflict(_)) => return Err(LedgerError::DuplicateUser),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(%id, "User registered");
        Ok(RegisteredUser {
            id,
            user_id: user.external_id,
            name: user.name,
            phone: user.phone,
        })
    }

    /// Current balance of a registered member.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UserNotFound` if the member is unknown.
    pub async fn balance(&self, user_id: &str) -> Result<i64, LedgerError> {
        let user = ExternalId::parse(user_id)?;
        self.store
            .find_user_by_external_id(&user)
            .await?
            .ok_or(LedgerError::UserNotFound)?;
        Ok(self.store.sum_points_for_user(&user).await?)
    }

    /// Award points for a purchase: one point per 25 currency units, rounded down.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` or `LedgerError::InvalidAmount` for a
    /// malformed request and `LedgerError::UserNotFound` for an unknown member.
    #[instrument(skip(self, request), fields(user = %request.user_id, branch = %request.branch))]
    pub async fn record_spending(
        &self,
        request: NewSpending,
    ) -> Result<SpendingReceipt, LedgerError> {
        let user = ExternalId::parse(&request.user_id)?;
        let branch = required("branch", &request.branch)?;
        let receipt_no = required("receipt_no", &request.receipt_no)?;
        let amount = request
            .spending_value
            .ok_or_else(|| LedgerError::Validation("spending_value is required".to_owned()))?;
        let amount = SpendingAmount::parse(amount)?;
        let points = amount.points()?;

        if self.store.find_user_by_external_id(&user).await?.is_none() {
            return Err(LedgerError::UserNotFound);
        }

        let photo = request
            .receipt_photo_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());
        let entry = NewTransaction::spending(
            user,
            branch,
            receipt_no,
            photo,
            amount.amount(),
            points,
            request.timestamp.unwrap_or_else(Utc::now),
        );
        let transaction_id = self.store.insert_transaction(entry).await?;

        tracing::info!(%transaction_id, %points, "Spending recorded");
        Ok(SpendingReceipt {
            transaction_id,
            points: points.value(),
        })
    }

    /// Redeem a promotion for a member and issue a coupon.
    ///
    /// Validation reads are advisory; the store commit re-checks stock and
    /// balance atomically, so concurrent requests cannot oversell.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UserNotFound`, `LedgerError::PromotionUnavailable`
    /// or `LedgerError::InsufficientPoints` when the redemption is rejected.
    /// Nothing is written in any of these cases.
    #[instrument(
        skip(self, request),
        fields(user = %request.user_id, promotion = %request.promotion_id)
    )]
    pub async fn redeem(&self, request: RedemptionRequest) -> Result<Redemption, LedgerError> {
        let user = ExternalId::parse(&request.user_id)?;
        let branch = required("branch", &request.branch)?;

        if self.store.find_user_by_external_id(&user).await?.is_none() {
            return Err(LedgerError::UserNotFound);
        }

        let now = Utc::now();
        let promotion = self
            .store
            .get_promotion(request.promotion_id)
            .await?
            .filter(|p| p.is_available_on(now.date_naive()))
            .ok_or(LedgerError::PromotionUnavailable)?;

        let balance = self.store.sum_points_for_user(&user).await?;
        if balance < promotion.points_needed {
            return Err(LedgerError::InsufficientPoints {
                balance,
                required: promotion.points_needed,
            });
        }

        let coupon = CouponToken::generate();
        let outcome = self
            .store
            .commit_redemption(RedemptionCommit {
                user,
                promotion_id: promotion.id,
                branch,
                coupon,
                occurred_at: now,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => LedgerError::UserNotFound,
                other => LedgerError::Store(other),
            })?;

        match outcome {
            RedemptionOutcome::Committed {
                transaction_id,
                points_spent,
                balance_after,
            } => {
                tracing::info!(%transaction_id, %coupon, "Promotion redeemed");
                Ok(Redemption {
                    coupon_id: coupon,
                    transaction_id,
                    points_spent: points_spent.value(),
                    balance: balance_after,
                })
            }
            RedemptionOutcome::Exhausted => Err(LedgerError::PromotionUnavailable),
            RedemptionOutcome::InsufficientPoints { balance, required } => {
                Err(LedgerError::InsufficientPoints { balance, required })
            }
        }
    }

    /// Mark a coupon as used at `location`. Succeeds at most once per coupon.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::CouponNotFound` for an unknown token and
    /// `LedgerError::CouponNotValid` if the coupon was already used.
    #[instrument(skip(self))]
    pub async fn use_coupon(&self, token: CouponToken, location: &str) -> Result<(), LedgerError> {
        let location = required("use_location", location)?;

        let status = self
            .store
            .get_coupon_status(token)
            .await?
            .ok_or(LedgerError::CouponNotFound)?;
        if !status.can_transition_to(CouponStatus::Used) {
            return Err(LedgerError::CouponNotValid { status });
        }

        let changed = self
            .store
            .set_coupon_status(token, CouponStatus::Valid, CouponStatus::Used, &location)
            .await?;
        if changed == 0 {
            // Lost the race to another request.
            return Err(LedgerError::CouponNotValid {
                status: CouponStatus::Used,
            });
        }

        tracing::info!(%location, "Coupon used");
        Ok(())
    }
}

/// Trim a required text field.
fn required(field: &str, value: &str) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}
