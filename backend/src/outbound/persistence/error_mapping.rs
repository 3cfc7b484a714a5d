//! Shared classification of pool and Diesel failures.
//!
//! Each repository turns a [`StorageFailure`] into its own port error, so
//! constraint names only need to be matched in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::models::RowDecodeError;
use super::pool::PoolError;

/// Unique constraint on `users.username`.
pub(crate) const USERNAME_UNIQUE: &str = "users_username_key";
/// Unique constraint on `requests.request_number`.
pub(crate) const REQUEST_NUMBER_UNIQUE: &str = "requests_request_number_key";

/// Storage failure reduced to what the repositories distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StorageFailure {
    /// The pool or the connection is unusable.
    Connection(String),
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key constraint rejected the write.
    ForeignKeyViolation { constraint: Option<String> },
    /// Anything else.
    Query(String),
}

impl StorageFailure {
    /// Whether this is a unique violation of `constraint`.
    pub(crate) fn violates_unique(&self, constraint: &str) -> bool {
        matches!(
            self,
            Self::UniqueViolation { constraint: Some(name) } if name == constraint
        )
    }
}

impl From<PoolError> for StorageFailure {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::Unavailable { message } | PoolError::Setup { message } => {
                Self::Connection(message)
            }
        }
    }
}

impl From<DieselError> for StorageFailure {
    fn from(error: DieselError) -> Self {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(
                    ?kind,
                    message = info.message(),
                    constraint = info.constraint_name(),
                    "diesel operation failed"
                );
            }
            _ => debug!(
                error_type = %std::any::type_name_of_val(&error),
                "diesel operation failed"
            ),
        }

        match error {
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::Connection("database connection error".to_owned())
            }
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::ForeignKeyViolation {
                    constraint: info.constraint_name().map(str::to_owned),
                }
            }
            DieselError::NotFound => Self::Query("record not found".to_owned()),
            DieselError::QueryBuilderError(_) => Self::Query("database query error".to_owned()),
            _ => Self::Query("database error".to_owned()),
        }
    }
}

impl From<RowDecodeError> for StorageFailure {
    fn from(error: RowDecodeError) -> Self {
        Self::Query(error.to_string())
    }
}
