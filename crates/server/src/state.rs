//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::LoyaltyConfig;
use crate::db::PgLedgerStore;
use crate::ledger::LedgerService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: LoyaltyConfig,
    pool: PgPool,
    ledger: LedgerService<PgLedgerStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: LoyaltyConfig, pool: PgPool) -> Self {
        let ledger = LedgerService::new(PgLedgerStore::new(pool.clone()));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                ledger,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &LoyaltyConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the ledger service.
    #[must_use]
    pub fn ledger(&self) -> &LedgerService<PgLedgerStore> {
        &self.inner.ledger
    }
}
