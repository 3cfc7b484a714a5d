//! Shared PostgreSQL connections for the Diesel repositories.
//!
//! A failed checkout is reported as [`PoolError::Unavailable`]; repositories
//! treat it as a connection failure, which is what lets reads retry.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tracing::debug;

/// Longest a repository call waits for a free connection.
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures opening the pool or borrowing from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection could be handed out before the checkout timeout.
    #[error("database unavailable: {message}")]
    Unavailable { message: String },

    /// The pool rejected its settings or the first connect failed.
    #[error("cannot open database pool: {message}")]
    Setup { message: String },
}

/// Connection limits for one process.
///
/// The server sizes the pool from `db_max_connections`; `state-dump` needs a
/// single connection.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_connections: u32,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Settings for `database_url` allowing up to `max_connections` (at
    /// least one).
    pub fn new(database_url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: max_connections.max(1),
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    /// Replace the default ten-second checkout wait.
    #[must_use]
    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

/// Cloneable handle; clones share the same connections.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Open the pool. Connections are established lazily after the first.
    ///
    /// # Errors
    ///
    /// [`PoolError::Setup`] when the URL is rejected or the server cannot be
    /// reached.
    pub async fn connect(config: PoolConfig) -> Result<Self, PoolError> {
        let PoolConfig {
            database_url,
            max_connections,
            checkout_timeout,
        } = config;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let inner = Pool::builder()
            .max_size(max_connections)
            .connection_timeout(checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::Setup {
                message: err.to_string(),
            })?;
        Ok(Self { inner })
    }

    /// Borrow a connection for one repository call.
    ///
    /// # Errors
    ///
    /// [`PoolError::Unavailable`] when every connection stays busy past the
    /// checkout timeout or a fresh connect fails.
    pub async fn checkout(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner.get().await.map_err(|err| {
            debug!(error = %err, "connection checkout failed");
            PoolError::Unavailable {
                message: err.to_string(),
            }
        })
    }
}
