//! Member repository.

use sqlx::PgPool;

use loyalty_core::{ExternalId, UserId};

use super::{RepositoryError, conflict_on_violation};
use crate::models::{NewUser, User, UserSummary};

/// Repository for member database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all members, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r"
            SELECT id, external_id, name, phone, created_at, updated_at
            FROM loyalty.users
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Get a member by external identifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, external_id, name, phone, created_at, updated_at
            FROM loyalty.users
            WHERE external_id = $1
            ",
        )
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Register a member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the external id is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO loyalty.users (external_id, name, phone)
            VALUES ($1, $2, $3)
            RETURNING id, external_id, name, phone, created_at, updated_at
            ",
        )
        .bind(&user.external_id)
        .bind(&user.name)
        .bind(&user.phone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_violation(e, "user already exists"))
    }

    /// Update a member's name and phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no member has this ID.
    pub async fn update(
        &self,
        id: UserId,
        name: &str,
        phone: &str,
    ) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            r"
            UPDATE loyalty.users
            SET name = $2, phone = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, external_id, name, phone, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no member has this ID.
    /// Returns `RepositoryError::Conflict` if the member has ledger entries.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM loyalty.users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_violation(e, "user has ledger history"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Lifetime spending and current balance for a member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, external_id: &ExternalId) -> Result<UserSummary, RepositoryError> {
        let summary = sqlx::query_as::<_, UserSummary>(
            r"
            SELECT COALESCE(SUM(spending_value), 0) AS total_spending,
                   COALESCE(SUM(points), 0)::BIGINT AS total_points
            FROM loyalty.transactions
            WHERE user_external_id = $1
            ",
        )
        .bind(external_id)
        .fetch_one(self.pool)
        .await?;

        Ok(summary)
    }
}
