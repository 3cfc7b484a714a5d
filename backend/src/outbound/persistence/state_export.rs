//! Full-database dump used by the `state-dump` binary.
//!
//! Rows are read through the same Diesel models as the repositories, so the
//! dump shows stored codes exactly as persisted, password digests included.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;

use super::models::{CommentRow, RequestRow, StatusHistoryRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{comments, requests, status_history, users};

/// Errors raised while exporting.
#[derive(Debug, thiserror::Error)]
pub enum StateExportError {
    /// No connection could be checked out.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A table read failed.
    #[error("failed to read {table}: {message}")]
    Query { table: &'static str, message: String },
}

/// Snapshot of every table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDump {
    exported_at: DateTime<Utc>,
    users: Vec<UserRow>,
    requests: Vec<RequestRow>,
    comments: Vec<CommentRow>,
    status_history: Vec<StatusHistoryRow>,
}

impl StateDump {
    /// Row counts per table, in dump order.
    pub fn table_counts(&self) -> [(&'static str, usize); 4] {
        [
            ("users", self.users.len()),
            ("requests", self.requests.len()),
            ("comments", self.comments.len()),
            ("status_history", self.status_history.len()),
        ]
    }
}

fn query_failure(table: &'static str) -> impl FnOnce(diesel::result::Error) -> StateExportError {
    move |err| StateExportError::Query {
        table,
        message: err.to_string(),
    }
}

/// Read every table, ordered by primary key.
pub async fn export_state(
    pool: &DbPool,
    exported_at: DateTime<Utc>,
) -> Result<StateDump, StateExportError> {
    let mut conn = pool.checkout().await?;

    let users = users::table
        .select(UserRow::as_select())
        .order_by(users::id.asc())
        .load(&mut conn)
        .await
        .map_err(query_failure("users"))?;
    let requests = requests::table
        .select(RequestRow::as_select())
        .order_by(requests::id.asc())
        .load(&mut conn)
        .await
        .map_err(query_failure("requests"))?;
    let comments = comments::table
        .select(CommentRow::as_select())
        .order_by(comments::id.asc())
        .load(&mut conn)
        .await
        .map_err(query_failure("comments"))?;
    let status_history = status_history::table
        .select(StatusHistoryRow::as_select())
        .order_by(status_history::id.asc())
        .load(&mut conn)
        .await
        .map_err(query_failure("status_history"))?;

    Ok(StateDump {
        exported_at,
        users,
        requests,
        comments,
        status_history,
    })
}
