//! Ledger entries and the coupon views derived from them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use loyalty_core::{
    CouponStatus, CouponToken, ExternalId, Points, PromotionId, TransactionId, TransactionKind,
};

/// Details text written on every spending entry.
pub const SPENDING_DETAILS: &str = "Spending points added";

/// Details text written on every redemption entry.
pub const REDEMPTION_DETAILS: &str = "Points redeemed for promotion";

/// One append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_external_id: ExternalId,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    pub branch: String,
    pub receipt_no: Option<String>,
    pub receipt_photo_url: Option<String>,
    pub spending_value: Option<Decimal>,
    /// Signed delta: positive for spending, negative for redemption.
    pub points: i64,
    pub promotion_id: Option<PromotionId>,
    pub coupon_id: Option<CouponToken>,
    pub status: Option<CouponStatus>,
    pub use_location: Option<String>,
    pub used_at: Option<DateTime<Utc>>,
    pub details: String,
}

/// A ledger entry ready to be appended.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_external_id: ExternalId,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    pub branch: String,
    pub receipt_no: Option<String>,
    pub receipt_photo_url: Option<String>,
    pub spending_value: Option<Decimal>,
    pub points: Points,
    pub promotion_id: Option<PromotionId>,
    pub coupon_id: Option<CouponToken>,
    pub status: Option<CouponStatus>,
    pub details: String,
}

impl NewTransaction {
    /// A spending entry awarding `points` for `amount`.
    #[must_use]
    pub fn spending(
        user: ExternalId,
        branch: String,
        receipt_no: String,
        receipt_photo_url: Option<String>,
        amount: Decimal,
        points: Points,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_external_id: user,
            kind: TransactionKind::Spending,
            occurred_at,
            branch,
            receipt_no: Some(receipt_no),
            receipt_photo_url,
            spending_value: Some(amount),
            points,
            promotion_id: None,
            coupon_id: None,
            status: None,
            details: SPENDING_DETAILS.to_owned(),
        }
    }

    /// A redemption entry charging `cost` and issuing a valid coupon.
    #[must_use]
    pub fn redemption(
        user: ExternalId,
        branch: String,
        promotion_id: PromotionId,
        coupon: CouponToken,
        cost: Points,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_external_id: user,
            kind: TransactionKind::Redeem,
            occurred_at,
            branch,
            receipt_no: None,
            receipt_photo_url: None,
            spending_value: None,
            points: cost.as_cost(),
            promotion_id: Some(promotion_id),
            coupon_id: Some(coupon),
            status: Some(CouponStatus::Valid),
            details: REDEMPTION_DETAILS.to_owned(),
        }
    }
}

/// A coupon owned by a member, joined with its promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserCoupon {
    pub coupon_id: CouponToken,
    pub status: CouponStatus,
    pub use_location: Option<String>,
    pub redeemed_at: DateTime<Utc>,
    pub promotion_id: PromotionId,
    pub promotion_name: String,
    pub description: String,
    pub points_needed: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub image_url: Option<String>,
}

/// What staff see when scanning a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CouponDetails {
    pub coupon_id: CouponToken,
    pub status: CouponStatus,
    pub user_name: String,
    pub promotion_name: String,
    pub use_location: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_redemption_entry_is_negative_with_valid_coupon() {
        let user = ExternalId::parse("member-1").unwrap();
        let entry = NewTransaction::redemption(
            user,
            "Central".to_owned(),
            PromotionId::new(3),
            CouponToken::generate(),
            Points::new(40),
            Utc::now(),
        );

        assert_eq!(entry.kind, TransactionKind::Redeem);
        assert_eq!(entry.points, Points::new(-40));
        assert_eq!(entry.status, Some(CouponStatus::Valid));
        assert_eq!(entry.details, REDEMPTION_DETAILS);
        assert!(entry.spending_value.is_none());
    }

    #[test]
    fn test_spending_entry_has_no_coupon() {
        let user = ExternalId::parse("member-1").unwrap();
        let entry = NewTransaction::spending(
            user,
            "Central".to_owned(),
            "R-001".to_owned(),
            None,
            Decimal::from(80),
            Points::new(3),
            Utc::now(),
        );

        assert_eq!(entry.kind, TransactionKind::Spending);
        assert_eq!(entry.points, Points::new(3));
        assert!(entry.coupon_id.is_none());
        assert!(entry.status.is_none());
        assert_eq!(entry.details, SPENDING_DETAILS);
    }
}
