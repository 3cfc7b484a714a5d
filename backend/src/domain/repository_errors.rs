//! Translation of repository port errors into domain [`Error`]s, plus the
//! bounded retry applied to reads.
//!
//! Connection failures become `service_unavailable` and are the only class a
//! read retries. Query failures become `internal_error`.

use std::future::Future;

use tracing::warn;

use super::Error;
use super::ports::{
    CommentRepositoryError, RequestRepositoryError, StatusLedgerError, UserRepositoryError,
};

/// Extra attempts granted to a read after a connection failure.
pub(crate) const READ_RETRIES: u32 = 2;

/// Port errors that can tell a lost connection from other failures.
pub(crate) trait ConnectionFailure {
    fn is_connection(&self) -> bool;
}

impl ConnectionFailure for UserRepositoryError {
    fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

impl ConnectionFailure for RequestRepositoryError {
    fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

impl ConnectionFailure for StatusLedgerError {
    fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

impl ConnectionFailure for CommentRepositoryError {
    fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Run a read, retrying up to [`READ_RETRIES`] times on connection failures.
pub(crate) async fn retry_read<T, E, F, Fut>(operation: &str, mut attempt: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ConnectionFailure + std::fmt::Display,
{
    let mut retries = 0;
    loop {
        match attempt().await {
            Err(error) if error.is_connection() && retries < READ_RETRIES => {
                retries += 1;
                warn!(operation, retries, %error, "retrying read after connection failure");
            }
            result => return result,
        }
    }
}

pub(crate) fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateUsername { username } => {
            Error::conflict(format!("username {username} is already taken"))
        }
    }
}

pub(crate) fn map_request_error(error: RequestRepositoryError) -> Error {
    match error {
        RequestRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("request repository unavailable: {message}"))
        }
        RequestRepositoryError::Query { message } => {
            Error::internal(format!("request repository error: {message}"))
        }
        RequestRepositoryError::DuplicateNumber { number } => {
            Error::conflict(format!("request number {number} is already allocated"))
        }
        RequestRepositoryError::UnknownUser { user_id } => {
            Error::not_found(format!("user {user_id} not found"))
        }
    }
}

pub(crate) fn map_ledger_error(error: StatusLedgerError) -> Error {
    match error {
        StatusLedgerError::Connection { message } => {
            Error::service_unavailable(format!("status ledger unavailable: {message}"))
        }
        StatusLedgerError::Query { message } => {
            Error::internal(format!("status ledger error: {message}"))
        }
        StatusLedgerError::RequestNotFound { request_id } => {
            Error::not_found(format!("request {request_id} not found"))
        }
        StatusLedgerError::UnknownUser { user_id } => {
            Error::not_found(format!("user {user_id} not found"))
        }
    }
}

pub(crate) fn map_comment_error(error: CommentRepositoryError) -> Error {
    match error {
        CommentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("comment repository unavailable: {message}"))
        }
        CommentRepositoryError::Query { message } => {
            Error::internal(format!("comment repository error: {message}"))
        }
        CommentRepositoryError::MissingReference { message } => Error::not_found(message),
    }
}
