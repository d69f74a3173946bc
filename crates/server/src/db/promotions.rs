//! Promotion repository.

use sqlx::{PgExecutor, PgPool};

use loyalty_core::PromotionId;

use super::{RepositoryError, conflict_on_violation};
use crate::models::{Promotion, PromotionInput};

/// Fetch a promotion on any executor (pool or open transaction).
pub(crate) async fn fetch<'e, E>(
    executor: E,
    id: PromotionId,
) -> Result<Option<Promotion>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Promotion>(
        r"
        SELECT id, name, description, points_needed, quantity,
               start_date, end_date, image_url, created_at, updated_at
        FROM loyalty.promotions
        WHERE id = $1
        ",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Repository for promotion database operations.
pub struct PromotionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromotionRepository<'a> {
    /// Create a new promotion repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all promotions ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Promotion>, RepositoryError> {
        let promotions = sqlx::query_as::<_, Promotion>(
            r"
            SELECT id, name, description, points_needed, quantity,
                   start_date, end_date, image_url, created_at, updated_at
            FROM loyalty.promotions
            ORDER BY start_date, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(promotions)
    }

    /// Get a promotion by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PromotionId) -> Result<Option<Promotion>, RepositoryError> {
        Ok(fetch(self.pool, id).await?)
    }

    /// Create a promotion from validated input.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &PromotionInput) -> Result<Promotion, RepositoryError> {
        let promotion = sqlx::query_as::<_, Promotion>(
            r"
            INSERT INTO loyalty.promotions
                (name, description, points_needed, quantity, start_date, end_date, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, description, points_needed, quantity,
                      start_date, end_date, image_url, created_at, updated_at
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.points_needed)
        .bind(input.quantity)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.image_url)
        .fetch_one(self.pool)
        .await?;

        Ok(promotion)
    }

    /// Replace a promotion's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no promotion has this ID.
    pub async fn update(
        &self,
        id: PromotionId,
        input: &PromotionInput,
    ) -> Result<Promotion, RepositoryError> {
        sqlx::query_as::<_, Promotion>(
            r"
            UPDATE loyalty.promotions
            SET name = $2, description = $3, points_needed = $4, quantity = $5,
                start_date = $6, end_date = $7, image_url = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, points_needed, quantity,
                      start_date, end_date, image_url, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.points_needed)
        .bind(input.quantity)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.image_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no promotion has this ID.
    /// Returns `RepositoryError::Conflict` if redemptions reference it.
    pub async fn delete(&self, id: PromotionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM loyalty.promotions WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_violation(e, "promotion has redemptions"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
