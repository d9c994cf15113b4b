//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::FranklinConfig;
use crate::services::store_locator::{StoreLocatorClient, StoreLocatorError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; gives handlers the database pool, the store
/// lookup client and the configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: FranklinConfig,
    pool: PgPool,
    store_locator: StoreLocatorClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lookup HTTP client cannot be built.
    pub fn new(config: FranklinConfig, pool: PgPool) -> Result<Self, StoreLocatorError> {
        let store_locator = StoreLocatorClient::new(&config.store_locator)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                store_locator,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &FranklinConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the store lookup client.
    #[must_use]
    pub fn store_locator(&self) -> &StoreLocatorClient {
        &self.inner.store_locator
    }
}
