//! Dump every repair desk table as one JSON document.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use mockable::{Clock, DefaultClock};
use repair_desk::outbound::persistence::{DbPool, PoolConfig, export_state};
use tokio::runtime::Builder;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

/// `state-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "state-dump",
    about = "Export users, requests, comments and status history as pretty JSON",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
    /// Write here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "path")]
    output: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url)?;
    let pool = DbPool::connect(PoolConfig::new(database_url, 1))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let dump = export_state(&pool, DefaultClock.utc())
        .await
        .map_err(|error| io::Error::other(format!("export state: {error}")))?;
    for (table, rows) in dump.table_counts() {
        info!(table, rows, "exported table");
    }

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &dump).map_err(io::Error::other)?;
    writeln!(writer)?;
    writer.flush()
}

fn resolve_database_url(cli_value: Option<String>) -> io::Result<String> {
    cli_value
        .or_else(|| env::var("DATABASE_URL").ok())
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "pass --database-url or set DATABASE_URL",
            )
        })
}
