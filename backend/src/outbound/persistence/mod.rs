//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the repository ports backed by PostgreSQL via
//! `diesel-async` and a `bb8` pool.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Permission checks and validation live in the services.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Atomic writes**: request numbering and status transitions each run in
//!   one transaction, serialized by an advisory lock and a row lock
//!   respectively.
//! - **Typed errors**: pool and Diesel failures are classified once in
//!   `error_mapping.rs` and mapped onto each port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use repair_desk::outbound::persistence::{DbPool, DieselRequestRepository, PoolConfig};
//!
//! let pool = DbPool::connect(PoolConfig::new("postgres://localhost/repair_desk", 10)).await?;
//! let requests = DieselRequestRepository::new(pool);
//! ```

mod diesel_comment_repository;
mod diesel_request_repository;
mod diesel_status_ledger_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;
mod state_export;

pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_request_repository::DieselRequestRepository;
pub use diesel_status_ledger_repository::DieselStatusLedgerRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{
    MIGRATIONS, MigrationError, run_pending_migrations, run_pending_migrations_blocking,
};
pub use pool::{DbPool, PoolConfig, PoolError};
pub use state_export::{StateDump, StateExportError, export_state};
