//! Driving port for request comments.

use async_trait::async_trait;

use crate::domain::{Comment, CommentDraft, CommentView, CurrentActorContext, Error, RequestId};

/// Domain use-case port for the per-request comment thread.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentThread: Send + Sync {
    /// Append a comment to a visible request.
    async fn add(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        draft: CommentDraft,
    ) -> Result<Comment, Error>;

    /// Comments of a visible request, oldest first.
    async fn list(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
    ) -> Result<Vec<CommentView>, Error>;
}
