//! Staff authentication service.
//!
//! Passwords are hashed with Argon2id; sessions are handled by the caller.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;
use sqlx::PgPool;

use loyalty_core::{StaffId, StaffRole};

use crate::db::{RepositoryError, StaffRepository};
use crate::models::{NewStaff, Staff, StaffUpdate};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Fields for creating a staff account.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffRegistration {
    pub name: String,
    pub password: String,
    pub location: String,
    #[serde(default = "default_role")]
    pub role: StaffRole,
}

const fn default_role() -> StaffRole {
    StaffRole::Staff
}

/// Staff authentication service.
pub struct StaffAuthService<'a> {
    staff: StaffRepository<'a>,
}

impl<'a> StaffAuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            staff: StaffRepository::new(pool),
        }
    }

    /// Create a staff account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for blank fields,
    /// `AuthError::WeakPassword` for a short password and
    /// `AuthError::StaffAlreadyExists` if the name is taken.
    pub async fn register(&self, registration: StaffRegistration) -> Result<Staff, AuthError> {
        let name = required("name", &registration.name)?;
        let location = required("location", &registration.location)?;
        validate_password(&registration.password)?;
        let password_hash = hash_password(&registration.password)?;

        let staff = self
            .staff
            .create(&NewStaff {
                name,
                password_hash,
                location,
                role: registration.role,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::StaffAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(staff_id = %staff.id, role = %staff.role, "Staff account created");
        Ok(staff)
    }

    /// Login with name and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the name or password is wrong.
    pub async fn login(&self, name: &str, password: &str) -> Result<Staff, AuthError> {
        let (staff, password_hash) = self
            .staff
            .get_password_hash(name.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(staff)
    }

    /// Update name, location and role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StaffNotFound` for an unknown ID and
    /// `AuthError::StaffAlreadyExists` if the new name is taken.
    pub async fn update(&self, id: StaffId, update: StaffUpdate) -> Result<Staff, AuthError> {
        let update = StaffUpdate {
            name: required("name", &update.name)?,
            location: required("location", &update.location)?,
            role: update.role,
        };

        self.staff.update(id, &update).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::StaffNotFound,
            RepositoryError::Conflict(_) => AuthError::StaffAlreadyExists,
            other => AuthError::Repository(other),
        })
    }

    /// Delete a staff account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StaffNotFound` for an unknown ID.
    pub async fn delete(&self, id: StaffId) -> Result<(), AuthError> {
        self.staff.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::StaffNotFound,
            other => AuthError::Repository(other),
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_owned())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_registration_role_defaults_to_staff() {
        let registration: StaffRegistration = serde_json::from_str(
            r#"{"name": "kim", "password": "longenough", "location": "Central"}"#,
        )
        .unwrap();
        assert_eq!(registration.role, StaffRole::Staff);
    }
}
