//! Staff account repository.

use sqlx::PgPool;

use loyalty_core::StaffId;

use super::{RepositoryError, conflict_on_violation};
use crate::models::{NewStaff, Staff, StaffUpdate};

/// Staff row including the password hash, only used for login.
#[derive(Debug, sqlx::FromRow)]
struct StaffWithHash {
    #[sqlx(flatten)]
    staff: Staff,
    password_hash: String,
}

/// Repository for staff database operations.
pub struct StaffRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StaffRepository<'a> {
    /// Create a new staff repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all staff accounts by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Staff>, RepositoryError> {
        let staff = sqlx::query_as::<_, Staff>(
            r"
            SELECT id, name, location, role, created_at, updated_at
            FROM loyalty.staff
            ORDER BY name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(staff)
    }

    /// Get a staff account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: StaffId) -> Result<Option<Staff>, RepositoryError> {
        let staff = sqlx::query_as::<_, Staff>(
            r"
            SELECT id, name, location, role, created_at, updated_at
            FROM loyalty.staff
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(staff)
    }

    /// Get a staff account and its password hash by login name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        name: &str,
    ) -> Result<Option<(Staff, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, StaffWithHash>(
            r"
            SELECT id, name, location, role, created_at, updated_at, password_hash
            FROM loyalty.staff
            WHERE name = $1
            ",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.staff, r.password_hash)))
    }

    /// Create a staff account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, staff: &NewStaff) -> Result<Staff, RepositoryError> {
        sqlx::query_as::<_, Staff>(
            r"
            INSERT INTO loyalty.staff (name, password_hash, location, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, location, role, created_at, updated_at
            ",
        )
        .bind(&staff.name)
        .bind(&staff.password_hash)
        .bind(&staff.location)
        .bind(staff.role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_violation(e, "staff name already exists"))
    }

    /// Update name, location and role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this ID.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(&self, id: StaffId, update: &StaffUpdate) -> Result<Staff, RepositoryError> {
        sqlx::query_as::<_, Staff>(
            r"
            UPDATE loyalty.staff
            SET name = $2, location = $3, role = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, location, role, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.location)
        .bind(update.role)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_violation(e, "staff name already exists"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a staff account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this ID.
    pub async fn delete(&self, id: StaffId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM loyalty.staff WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
