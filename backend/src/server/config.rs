//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use repair_desk::outbound::persistence::DbPool;

/// Everything the server needs once settings are validated.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) overdue_after_days: u32,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        db_pool: DbPool,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool,
            overdue_after_days: repair_desk::domain::DEFAULT_OVERDUE_AFTER_DAYS,
        }
    }

    /// Override the quality desk's overdue threshold.
    #[must_use]
    pub fn with_overdue_after_days(mut self, days: u32) -> Self {
        self.overdue_after_days = days;
        self
    }
}
