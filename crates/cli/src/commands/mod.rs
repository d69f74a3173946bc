//! CLI subcommands.

pub mod migrate;
pub mod staff;

use loyalty_server::config::LoyaltyConfig;
use sqlx::PgPool;

/// Connect to the database named by `LOYALTY_DATABASE_URL` (or `DATABASE_URL`).
pub async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    let config = LoyaltyConfig::from_env()?;
    tracing::info!("Connecting to loyalty database...");
    Ok(loyalty_server::db::create_pool(&config.database_url).await?)
}
