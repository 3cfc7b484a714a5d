//! PostgreSQL-backed [`StatusLedgerRepository`].
//!
//! A transition locks the request row with `SELECT ... FOR UPDATE`, then
//! updates the status and appends the history row in the same transaction.
//! Concurrent transitions on one request serialize, and the later one sees
//! the earlier one's status as its prior status.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{StatusLedgerError, StatusLedgerRepository};
use crate::domain::{
    RequestId, RequestStatus, Role, StatusChange, StatusHistoryView, TransitionOutcome,
};

use super::error_mapping::StorageFailure;
use super::models::{NewStatusHistoryRow, RowDecodeError, StatusHistoryRow};
use super::pool::DbPool;
use super::schema::{requests, status_history, users};

/// Diesel implementation of the [`StatusLedgerRepository`] port.
#[derive(Clone)]
pub struct DieselStatusLedgerRepository {
    pool: DbPool,
}

impl DieselStatusLedgerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside the transition transaction; any variant rolls back.
#[derive(Debug)]
enum TransitionError {
    Diesel(diesel::result::Error),
    Missing,
    Corrupt(String),
}

impl From<diesel::result::Error> for TransitionError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl From<RowDecodeError> for TransitionError {
    fn from(error: RowDecodeError) -> Self {
        Self::Corrupt(error.to_string())
    }
}

fn map_failure(failure: impl Into<StorageFailure>) -> StatusLedgerError {
    match failure.into() {
        StorageFailure::Connection(message) => StatusLedgerError::connection(message),
        StorageFailure::Query(message) => StatusLedgerError::query(message),
        StorageFailure::UniqueViolation { .. } => {
            StatusLedgerError::query("unexpected unique violation")
        }
        StorageFailure::ForeignKeyViolation { .. } => {
            StatusLedgerError::query("unexpected foreign key violation")
        }
    }
}

async fn apply_transition(
    conn: &mut AsyncPgConnection,
    change: &StatusChange,
) -> Result<TransitionOutcome, TransitionError> {
    let request_id = change.request_id.get();
    let current: Option<String> = requests::table
        .find(request_id)
        .select(requests::status)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let current = current.ok_or(TransitionError::Missing)?;
    let current = current
        .parse::<RequestStatus>()
        .map_err(|err| TransitionError::Corrupt(err.to_string()))?;

    if current == change.new_status {
        return Ok(TransitionOutcome::Unchanged { status: current });
    }

    diesel::update(requests::table.find(request_id))
        .set((
            requests::status.eq(change.new_status.as_str()),
            requests::completed_on.eq(change.completion_date()),
        ))
        .execute(conn)
        .await?;

    let row = NewStatusHistoryRow {
        request_id,
        old_status: Some(current.as_str()),
        new_status: change.new_status.as_str(),
        changed_by: change.changed_by.get(),
        changed_at: change.at,
    };
    let inserted: StatusHistoryRow = diesel::insert_into(status_history::table)
        .values(&row)
        .returning(StatusHistoryRow::as_returning())
        .get_result(conn)
        .await?;
    Ok(TransitionOutcome::Recorded {
        entry: inserted.into_entry()?,
    })
}

#[async_trait]
impl StatusLedgerRepository for DieselStatusLedgerRepository {
    async fn transition(
        &self,
        change: &StatusChange,
    ) -> Result<TransitionOutcome, StatusLedgerError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        conn.transaction(|conn| async move { apply_transition(conn, change).await }.scope_boxed())
            .await
            .map_err(|err| match err {
                TransitionError::Missing => {
                    StatusLedgerError::request_not_found(change.request_id.get())
                }
                TransitionError::Corrupt(message) => StatusLedgerError::query(message),
                TransitionError::Diesel(error) => match StorageFailure::from(error) {
                    StorageFailure::ForeignKeyViolation { .. } => {
                        StatusLedgerError::unknown_user(change.changed_by.get())
                    }
                    failure => map_failure(failure),
                },
            })
    }

    async fn history(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<StatusHistoryView>, StatusLedgerError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let rows: Vec<(StatusHistoryRow, String, String)> = status_history::table
            .inner_join(users::table)
            .filter(status_history::request_id.eq(request_id.get()))
            .select((
                StatusHistoryRow::as_select(),
                users::full_name,
                users::role,
            ))
            .order_by((status_history::changed_at.desc(), status_history::id.desc()))
            .load(&mut conn)
            .await
            .map_err(map_failure)?;

        rows.into_iter()
            .map(|(row, changed_by_name, role)| {
                let changed_by_role = role
                    .parse::<Role>()
                    .map_err(|err| StatusLedgerError::query(err.to_string()))?;
                Ok(StatusHistoryView {
                    entry: row.into_entry().map_err(map_failure)?,
                    changed_by_name,
                    changed_by_role,
                })
            })
            .collect()
    }
}
