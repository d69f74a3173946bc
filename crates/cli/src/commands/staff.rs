//! Staff account management commands.
//!
//! # Environment Variables
//!
//! - `LOYALTY_DATABASE_URL` - `PostgreSQL` connection string
//! - `LOYALTY_STAFF_PASSWORD` - Password for the new account

use loyalty_core::StaffRole;
use loyalty_server::services::{AuthError, StaffAuthService, StaffRegistration};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use super::connect;

/// Errors that can occur during staff operations.
#[derive(Debug, Error)]
pub enum StaffError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: admin, staff")]
    InvalidRole(String),

    #[error("Connection error: {0}")]
    Connect(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a staff account and return its ID.
///
/// # Errors
///
/// Returns `StaffError` if the role is unknown, the password is missing or
/// weak, or the name is taken.
pub async fn create(name: &str, location: &str, role: &str) -> Result<i64, StaffError> {
    let role: StaffRole = role
        .parse()
        .map_err(|_| StaffError::InvalidRole(role.to_owned()))?;

    dotenvy::dotenv().ok();
    let password = std::env::var("LOYALTY_STAFF_PASSWORD")
        .map(SecretString::from)
        .map_err(|_| StaffError::MissingEnvVar("LOYALTY_STAFF_PASSWORD"))?;

    let pool = connect()
        .await
        .map_err(|e| StaffError::Connect(e.to_string()))?;

    tracing::info!("Creating staff account: {} ({})", name, role);
    let staff = StaffAuthService::new(&pool)
        .register(StaffRegistration {
            name: name.to_owned(),
            password: password.expose_secret().to_owned(),
            location: location.to_owned(),
            role,
        })
        .await?;

    tracing::info!("Created staff account {} with ID {}", staff.name, staff.id);
    Ok(staff.id.as_i64())
}
