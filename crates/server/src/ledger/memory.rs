//! In-process ledger store.
//!
//! Backs the service tests and local experiments. Every operation runs under
//! a single mutex, which makes `commit_redemption` trivially atomic.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use loyalty_core::{
    CouponStatus, CouponToken, ExternalId, Points, PromotionId, TransactionId, UserId,
};

use super::store::{LedgerStore, RedemptionCommit, RedemptionOutcome};
use crate::db::RepositoryError;
use crate::models::{NewTransaction, NewUser, Promotion, PromotionInput, Transaction, User};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    promotions: BTreeMap<PromotionId, Promotion>,
    transactions: Vec<Transaction>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn has_user(&self, user: &ExternalId) -> bool {
        self.users.iter().any(|u| &u.external_id == user)
    }

    fn balance(&self, user: &ExternalId) -> Result<i64, RepositoryError> {
        let total: i128 = self
            .transactions
            .iter()
            .filter(|t| &t.user_external_id == user)
            .map(|t| i128::from(t.points))
            .sum();
        i64::try_from(total).map_err(|_| {
            RepositoryError::DataCorruption(format!("balance of {user} is out of range"))
        })
    }

    fn append(&mut self, entry: NewTransaction) -> TransactionId {
        let id = TransactionId::new(self.next_id());
        self.transactions.push(Transaction {
            id,
            user_external_id: entry.user_external_id,
            kind: entry.kind,
            occurred_at: entry.occurred_at,
            branch: entry.branch,
            receipt_no: entry.receipt_no,
            receipt_photo_url: entry.receipt_photo_url,
            spending_value: entry.spending_value,
            points: entry.points.value(),
            promotion_id: entry.promotion_id,
            coupon_id: entry.coupon_id,
            status: entry.status,
            use_location: None,
            used_at: None,
            details: entry.details,
        });
        id
    }
}

/// Ledger store kept entirely in memory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a promotion. The input is stored as given.
    pub fn add_promotion(&self, input: PromotionInput) -> PromotionId {
        let mut inner = self.lock();
        let id = PromotionId::new(inner.next_id());
        let now = Utc::now();
        inner.promotions.insert(
            id,
            Promotion {
                id,
                name: input.name,
                description: input.description,
                points_needed: input.points_needed,
                quantity: input.quantity,
                start_date: input.start_date,
                end_date: input.end_date,
                image_url: input.image_url,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Current state of a promotion.
    #[must_use]
    pub fn promotion(&self, id: PromotionId) -> Option<Promotion> {
        self.lock().promotions.get(&id).cloned()
    }

    /// Ledger entries of one member in insertion order.
    #[must_use]
    pub fn transactions_for(&self, user: &ExternalId) -> Vec<Transaction> {
        self.lock()
            .transactions
            .iter()
            .filter(|t| &t.user_external_id == user)
            .cloned()
            .collect()
    }

    /// Number of ledger entries across all members.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.lock().transactions.len()
    }

    /// Number of registered members.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }
}

impl LedgerStore for MemoryStore {
    async fn sum_points_for_user(&self, user: &ExternalId) -> Result<i64, RepositoryError> {
        self.lock().balance(user)
    }

    async fn get_promotion(&self, id: PromotionId) -> Result<Option<Promotion>, RepositoryError> {
        Ok(self.promotion(id))
    }

    async fn commit_redemption(
        &self,
        commit: RedemptionCommit,
    ) -> Result<RedemptionOutcome, RepositoryError> {
        let mut inner = self.lock();
        if !inner.has_user(&commit.user) {
            return Err(RepositoryError::NotFound);
        }
        let balance = inner.balance(&commit.user)?;

        let Some(promotion) = inner.promotions.get_mut(&commit.promotion_id) else {
            return Ok(RedemptionOutcome::Exhausted);
        };
        if !promotion.is_available_on(commit.occurred_at.date_naive()) {
            return Ok(RedemptionOutcome::Exhausted);
        }
        let cost = promotion.points_needed;
        if balance < cost {
            return Ok(RedemptionOutcome::InsufficientPoints {
                balance,
                required: cost,
            });
        }
        promotion.quantity -= 1;
        promotion.updated_at = Utc::now();

        let points_spent = Points::new(cost);
        let transaction_id = inner.append(NewTransaction::redemption(
            commit.user,
            commit.branch,
            commit.promotion_id,
            commit.coupon,
            points_spent,
            commit.occurred_at,
        ));

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
        let mut inner = self.lock();
        if !inner.has_user(&entry.user_external_id) {
            return Err(RepositoryError::NotFound);
        }
        Ok(inner.append(entry))
    }

    async fn find_user_by_external_id(
        &self,
        user: &ExternalId,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| &u.external_id == user)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserId, RepositoryError> {
        let mut inner = self.lock();
        if inner.has_user(&user.external_id) {
            return Err(RepositoryError::Conflict("user already exists".to_owned()));
        }
        let id = UserId::new(inner.next_id());
        let now = Utc::now();
        inner.users.push(User {
            id,
            external_id: user.external_id,
            name: user.name,
            phone: user.phone,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn get_coupon_status(
        &self,
        token: CouponToken,
    ) -> Result<Option<CouponStatus>, RepositoryError> {
        Ok(self
            .lock()
            .transactions
            .iter()
            .find(|t| t.coupon_id == Some(token))
            .and_then(|t| t.status))
    }

    async fn set_coupon_status(
        &self,
        token: CouponToken,
        expected: CouponStatus,
        new: CouponStatus,
        location: &str,
    ) -> Result<u64, RepositoryError> {
        let mut inner = self.lock();
        let Some(entry) = inner
            .transactions
            .iter_mut()
            .find(|t| t.coupon_id == Some(token) && t.status == Some(expected))
        else {
            return Ok(0);
        };

        entry.status = Some(new);
        entry.use_location = Some(location.to_owned());
        entry.used_at = Some(Utc::now());
        Ok(1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;

    use super::*;

    fn member(store: &MemoryStore, id: &str) -> ExternalId {
        let external_id = ExternalId::parse(id).unwrap();
        let mut inner = store.lock();
        let id = UserId::new(inner.next_id());
        let now = Utc::now();
        inner.users.push(User {
            id,
            external_id: external_id.clone(),
            name: "Ada".to_owned(),
            phone: "0800000000".to_owned(),
            created_at: now,
            updated_at: now,
        });
        external_id
    }

    fn credit(store: &MemoryStore, user: &ExternalId, points: i64) {
        store.lock().append(NewTransaction::spending(
            user.clone(),
            "Central".to_owned(),
            "R-1".to_owned(),
            None,
            Decimal::ONE,
            Points::new(points),
            Utc::now(),
        ));
    }

    fn window(start: NaiveDate, end: NaiveDate) -> PromotionInput {
        PromotionInput {
            name: "Free coffee".to_owned(),
            description: String::new(),
            points_needed: 5,
            quantity: 3,
            start_date: start,
            end_date: end,
            image_url: None,
        }
    }

    fn commit(user: &ExternalId, promotion_id: PromotionId) -> RedemptionCommit {
        RedemptionCommit {
            user: user.clone(),
            promotion_id,
            branch: "Central".to_owned(),
            coupon: CouponToken::generate(),
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_balance_out_of_range_is_an_error() {
        let store = MemoryStore::new();
        let user = member(&store, "big");
        credit(&store, &user, i64::MAX);
        credit(&store, &user, i64::MAX);

        let err = store.sum_points_for_user(&user).await.unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[tokio::test]
    async fn test_commit_rechecks_validity_window() {
        let store = MemoryStore::new();
        let user = member(&store, "m1");
        credit(&store, &user, 100);
        let today = Utc::now().date_naive();
        let ended = store.add_promotion(window(
            today - Duration::days(10),
            today - Duration::days(1),
        ));
        let upcoming = store.add_promotion(window(
            today + Duration::days(1),
            today + Duration::days(10),
        ));

        for promotion_id in [ended, upcoming] {
            let outcome = store.commit_redemption(commit(&user, promotion_id)).await.unwrap();
            assert_eq!(outcome, RedemptionOutcome::Exhausted);
            assert_eq!(store.promotion(promotion_id).unwrap().quantity, 3);
        }
        assert_eq!(store.transaction_count(), 1);
    }

    #[tokio::test]
    async fn test_commit_inside_window_decrements_stock() {
        let store = MemoryStore::new();
        let user = member(&store, "m1");
        credit(&store, &user, 8);
        let today = Utc::now().date_naive();
        let promotion_id = store.add_promotion(window(today, today));

        let outcome = store.commit_redemption(commit(&user, promotion_id)).await.unwrap();

        assert!(matches!(
            outcome,
            RedemptionOutcome::Committed { balance_after: 3, .. }
        ));
        assert_eq!(store.promotion(promotion_id).unwrap().quantity, 2);
    }
}
