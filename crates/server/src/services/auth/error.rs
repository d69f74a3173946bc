//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during staff authentication and account management.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong name or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The login name is taken.
    #[error("staff member already exists")]
    StaffAlreadyExists,

    /// No staff account with this ID.
    #[error("staff member not found")]
    StaffNotFound,

    /// Password too short.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// A required field is missing.
    #[error("{0}")]
    Validation(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
