//! Points and the spending-to-points accrual rule.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Currency units of spending required for one point.
pub const POINTS_RATE: i64 = 25;

/// Largest amount accepted for a single purchase.
///
/// Caps one entry at 40 million points, so a member's balance stays far
/// inside `i64` for any realistic number of purchases.
pub const MAX_SPENDING_AMOUNT: i64 = 1_000_000_000;

/// Errors raised by the accrual rule and spending validation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsError {
    /// The amount is below zero.
    #[error("spending amount cannot be negative")]
    NegativeAmount,
    /// The amount is zero or below where a purchase is required.
    #[error("spending amount must be greater than zero")]
    NonPositiveAmount,
    /// The point value does not fit in an `i64`.
    #[error("spending amount is too large")]
    Overflow,
    /// The amount is above [`MAX_SPENDING_AMOUNT`].
    #[error("spending amount cannot exceed {MAX_SPENDING_AMOUNT}")]
    AmountTooLarge,
}

/// A signed quantity of loyalty points.
///
/// Positive for accruals, negative for redemption costs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Points(i64);

impl Points {
    /// Zero points.
    pub const ZERO: Self = Self(0);

    /// Create from a raw value.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Points earned for a spending amount: `floor(amount / 25)`.
    ///
    /// Amounts below one full step earn zero points, which is not an error.
    ///
    /// # Errors
    ///
    /// Returns `PointsError::NegativeAmount` for amounts below zero and
    /// `PointsError::Overflow` if the result does not fit in an `i64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use loyalty_core::Points;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Points::from_spending(Decimal::from(24)).unwrap().value(), 0);
    /// assert_eq!(Points::from_spending(Decimal::from(25)).unwrap().value(), 1);
    /// assert_eq!(Points::from_spending(Decimal::from(74)).unwrap().value(), 2);
    /// ```
    pub fn from_spending(amount: Decimal) -> Result<Self, PointsError> {
        if amount < Decimal::ZERO {
            return Err(PointsError::NegativeAmount);
        }

        amount
            .checked_div(Decimal::from(POINTS_RATE))
            .map(|steps| steps.floor())
            .and_then(|steps| steps.to_i64())
            .map(Self)
            .ok_or(PointsError::Overflow)
    }

    /// The ledger delta for spending these points on a redemption.
    #[must_use]
    pub const fn as_cost(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Points> for i64 {
    fn from(points: Points) -> Self {
        points.0
    }
}

/// A validated purchase amount.
///
/// Purchases must be strictly positive; the accrual rule itself accepts zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SpendingAmount(Decimal);

impl SpendingAmount {
    /// Validate a purchase amount.
    ///
    /// # Errors
    ///
    /// Returns `PointsError::NonPositiveAmount` if the amount is zero or negative
    /// and `PointsError::AmountTooLarge` above [`MAX_SPENDING_AMOUNT`].
    pub fn parse(amount: Decimal) -> Result<Self, PointsError> {
        if amount <= Decimal::ZERO {
            return Err(PointsError::NonPositiveAmount);
        }
        if amount > Decimal::from(MAX_SPENDING_AMOUNT) {
            return Err(PointsError::AmountTooLarge);
        }
        Ok(Self(amount))
    }

    /// Get the amount.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Points earned for this purchase.
    ///
    /// # Errors
    ///
    /// Returns `PointsError::Overflow` if the amount is too large.
    pub fn points(self) -> Result<Points, PointsError> {
        Points::from_spending(self.0)
    }
}
