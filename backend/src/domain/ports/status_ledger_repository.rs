//! Port for the status ledger: status mutation coupled with its audit entry.

use async_trait::async_trait;

use crate::domain::{RequestId, StatusChange, StatusHistoryView, TransitionOutcome};

use super::define_port_error;

define_port_error! {
    /// Errors raised by status ledger adapters.
    pub enum StatusLedgerError {
        /// Repository connection could not be established.
        Connection { message: String } => "status ledger connection failed: {message}",
        /// Query or mutation failed; nothing was committed.
        Query { message: String } => "status ledger query failed: {message}",
        /// The request does not exist.
        RequestNotFound { request_id: i32 } => "request {request_id} not found",
        /// The acting user does not exist.
        UnknownUser { user_id: i32 } => "user {user_id} does not exist",
    }
}

/// Port for status transitions and history reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusLedgerRepository: Send + Sync {
    /// Apply `change` under a row lock.
    ///
    /// Same-status changes return [`TransitionOutcome::Unchanged`] and write
    /// nothing. Otherwise the status update, completion date, and history
    /// entry commit together or not at all.
    async fn transition(&self, change: &StatusChange)
    -> Result<TransitionOutcome, StatusLedgerError>;

    /// History for a request, newest first.
    async fn history(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<StatusHistoryView>, StatusLedgerError>;
}
