//! Promotion types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use loyalty_core::PromotionId;

/// A reward that members can redeem points for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Promotion {
    pub id: PromotionId,
    pub name: String,
    pub description: String,
    /// Points cost of one redemption.
    pub points_needed: i64,
    /// Remaining stock. Never negative.
    pub quantity: i32,
    /// First day the promotion can be redeemed (inclusive).
    pub start_date: NaiveDate,
    /// Last day the promotion can be redeemed (inclusive).
    pub end_date: NaiveDate,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Promotion {
    /// Whether `date` falls inside the validity window.
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Whether the promotion can be redeemed on `date`.
    #[must_use]
    pub fn is_available_on(&self, date: NaiveDate) -> bool {
        self.quantity > 0 && self.is_active_on(date)
    }
}

/// Create or update payload for a promotion.
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub points_needed: i64,
    pub quantity: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PromotionInput {
    /// Check field constraints and normalize whitespace.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_owned();
        self.description = self.description.trim().to_owned();
        self.image_url = self
            .image_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());

        if self.name.is_empty() {
            return Err("promotion name is required".to_owned());
        }
        if self.points_needed < 0 {
            return Err("points_needed cannot be negative".to_owned());
        }
        if self.quantity < 0 {
            return Err("quantity cannot be negative".to_owned());
        }
        if self.start_date > self.end_date {
            return Err("start_date must not be after end_date".to_owned());
        }
        Ok(self)
    }
}
