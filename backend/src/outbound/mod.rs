//! Outbound adapters implementing the domain's repository ports.
//!
//! - **persistence**: PostgreSQL through Diesel, used by the server.
//! - **memory**: a mutex-guarded in-process store for behavioural tests.
//!
//! Adapters translate between domain types and storage rows; they hold no
//! business rules beyond what the schema itself enforces.

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod persistence;
