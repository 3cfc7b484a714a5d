//! PostgreSQL-backed [`CommentRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CommentRepository, CommentRepositoryError};
use crate::domain::{Comment, CommentView, NewComment, RequestId, Role};

use super::error_mapping::StorageFailure;
use super::models::{CommentRow, NewCommentRow};
use super::pool::DbPool;
use super::schema::{comments, users};

/// Diesel implementation of the [`CommentRepository`] port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<StorageFailure>) -> CommentRepositoryError {
    match failure.into() {
        StorageFailure::Connection(message) => CommentRepositoryError::connection(message),
        StorageFailure::Query(message) => CommentRepositoryError::query(message),
        StorageFailure::ForeignKeyViolation { constraint } => {
            CommentRepositoryError::missing_reference(format!(
                "comment references a missing row ({})",
                constraint.as_deref().unwrap_or("unknown constraint")
            ))
        }
        StorageFailure::UniqueViolation { .. } => {
            CommentRepositoryError::query("unexpected unique violation")
        }
    }
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn append(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let row = NewCommentRow {
            request_id: comment.request_id.get(),
            user_id: comment.author_id.get(),
            body: comment.body.as_ref(),
            is_technical_note: comment.is_technical_note,
            parts_ordered: comment.parts_ordered.as_deref(),
            created_at: comment.created_at,
        };
        let inserted: CommentRow = diesel::insert_into(comments::table)
            .values(&row)
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_failure)?;
        inserted.into_comment().map_err(map_failure)
    }

    async fn list_for_request(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<CommentView>, CommentRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let rows: Vec<(CommentRow, String, String)> = comments::table
            .inner_join(users::table)
            .filter(comments::request_id.eq(request_id.get()))
            .select((CommentRow::as_select(), users::full_name, users::role))
            .order_by((comments::created_at.asc(), comments::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_failure)?;

        rows.into_iter()
            .map(|(row, author_name, role)| {
                let author_role = role
                    .parse::<Role>()
                    .map_err(|err| CommentRepositoryError::query(err.to_string()))?;
                Ok(CommentView {
                    comment: row.into_comment().map_err(map_failure)?,
                    author_name,
                    author_role,
                })
            })
            .collect()
    }
}
