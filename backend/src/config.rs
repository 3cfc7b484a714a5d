//! Application settings loaded via OrthoConfig.
//!
//! Every field reads from `REPAIR_DESK_*` environment variables, a config
//! file, or CLI flags. Unset values fall back to the defaults below.

use std::net::{AddrParseError, SocketAddr};

use mockable::Env;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_OVERDUE_AFTER_DAYS;

/// Bind address when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// Conventional variable consulted when `REPAIR_DESK_DATABASE_URL` is unset.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REPAIR_DESK")]
pub struct AppSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Age in days after which new or in-repair work counts as overdue.
    pub overdue_after_days: Option<u32>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl AppSettings {
    /// Configured database URL, else `DATABASE_URL` from `env`.
    pub fn database_url(&self, env: &impl Env) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| env.string(DATABASE_URL_ENV))
            .filter(|url| !url.trim().is_empty())
    }

    /// Configured bind address, else [`DEFAULT_BIND_ADDR`].
    ///
    /// # Errors
    ///
    /// [`AddrParseError`] when the configured value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn overdue_after_days(&self) -> u32 {
        self.overdue_after_days
            .unwrap_or(DEFAULT_OVERDUE_AFTER_DAYS)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings loading.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use mockable::MockEnv;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 5] = [
        "REPAIR_DESK_DATABASE_URL",
        "REPAIR_DESK_BIND_ADDR",
        "REPAIR_DESK_DB_MAX_CONNECTIONS",
        "REPAIR_DESK_OVERDUE_AFTER_DAYS",
        "REPAIR_DESK_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("repair-desk")]).expect("config should load")
    }

    fn no_env() -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string().returning(|_| None);
        env
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();

        assert_eq!(settings.database_url(&no_env()), None);
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.db_max_connections(), 10);
        assert_eq!(settings.overdue_after_days(), 3);
        assert!(settings.run_migrations);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "REPAIR_DESK_DATABASE_URL",
                Some("postgres://desk@localhost/desk".to_owned()),
            ),
            ("REPAIR_DESK_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("REPAIR_DESK_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("REPAIR_DESK_OVERDUE_AFTER_DAYS", Some("7".to_owned())),
            ("REPAIR_DESK_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();

        assert_eq!(
            settings.database_url(&no_env()).as_deref(),
            Some("postgres://desk@localhost/desk")
        );
        assert_eq!(
            settings.bind_addr().expect("override").port(),
            9000
        );
        assert_eq!(settings.db_max_connections(), 4);
        assert_eq!(settings.overdue_after_days(), 7);
        assert!(!settings.run_migrations);
    }

    #[rstest]
    fn database_url_falls_back_to_conventional_variable() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));
        let mut env = MockEnv::new();
        env.expect_string()
            .withf(|name| name == DATABASE_URL_ENV)
            .returning(|_| Some("postgres://fallback/desk".to_owned()));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.database_url(&env).as_deref(),
            Some("postgres://fallback/desk")
        );
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env([("REPAIR_DESK_BIND_ADDR", Some("not an address".to_owned()))]);

        assert!(load_from_empty_args().bind_addr().is_err());
    }
}
