//! Port for append-only request comments.

use async_trait::async_trait;

use crate::domain::{Comment, CommentView, NewComment, RequestId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by comment repository adapters.
    pub enum CommentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "comment repository query failed: {message}",
        /// The request or author referenced by the comment does not exist.
        MissingReference { message: String } => "comment reference missing: {message}",
    }
}

/// Port for writing and reading comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Append a comment.
    async fn append(&self, comment: &NewComment) -> Result<Comment, CommentRepositoryError>;

    /// Comments for a request, oldest first, joined with author name and role.
    async fn list_for_request(
        &self,
        request_id: RequestId,
    ) -> Result<Vec<CommentView>, CommentRepositoryError>;
}
