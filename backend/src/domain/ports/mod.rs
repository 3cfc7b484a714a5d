//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by persistence adapters and
//! expose typed errors. Driving ports are implemented by the domain services
//! and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod assignment_manager;
mod authentication_gateway;
mod comment_repository;
mod comment_thread;
mod quality_desk;
mod request_repository;
mod request_store;
mod statistics_aggregator;
mod status_ledger_repository;
mod status_transition_ledger;
mod user_directory;
mod user_repository;

pub use assignment_manager::AssignmentManager;
#[cfg(test)]
pub use assignment_manager::MockAssignmentManager;
pub use authentication_gateway::AuthenticationGateway;
#[cfg(test)]
pub use authentication_gateway::MockAuthenticationGateway;
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentRepository, CommentRepositoryError};
pub use comment_thread::CommentThread;
#[cfg(test)]
pub use comment_thread::MockCommentThread;
#[cfg(test)]
pub use quality_desk::MockQualityDesk;
pub use quality_desk::QualityDesk;
#[cfg(test)]
pub use request_repository::MockRequestRepository;
pub use request_repository::{RequestRepository, RequestRepositoryError};
#[cfg(test)]
pub use request_store::MockRequestStore;
pub use request_store::RequestStore;
#[cfg(test)]
pub use statistics_aggregator::MockStatisticsAggregator;
pub use statistics_aggregator::StatisticsAggregator;
#[cfg(test)]
pub use status_ledger_repository::MockStatusLedgerRepository;
pub use status_ledger_repository::{StatusLedgerError, StatusLedgerRepository};
#[cfg(test)]
pub use status_transition_ledger::MockStatusTransitionLedger;
pub use status_transition_ledger::StatusTransitionLedger;
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::UserDirectory;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserRepository, UserRepositoryError};
