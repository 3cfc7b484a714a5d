//! Repair desk entry point: settings, tracing, migrations, pool, server.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use repair_desk::config::AppSettings;
use repair_desk::inbound::http::health::HealthState;
use repair_desk::inbound::http::session_config::{
    BuildMode, fingerprint::key_fingerprint, session_settings_from_env,
};
use repair_desk::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|error| eyre!("load settings: {error}"))?;
    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .wrap_err("session configuration")?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let database_url = settings
        .database_url(&env)
        .ok_or_else(|| eyre!("set REPAIR_DESK_DATABASE_URL or DATABASE_URL"))?;
    if settings.run_migrations {
        run_pending_migrations(&database_url)
            .await
            .wrap_err("apply migrations")?;
    }
    let pool = DbPool::connect(PoolConfig::new(
        database_url,
        settings.db_max_connections(),
    ))
    .await
    .wrap_err("create database pool")?;

    let bind_addr = settings.bind_addr().wrap_err("parse bind address")?;
    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
        pool,
    )
    .with_overdue_after_days(settings.overdue_after_days());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "repair desk listening");
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome.wrap_err("server terminated")
}
