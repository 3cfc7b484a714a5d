//! Comment thread service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::repository_errors::{map_comment_error, retry_read};
use super::request_store_service::find_visible_request;
use crate::domain::ports::{CommentRepository, CommentThread, RequestRepository};
use crate::domain::{
    Comment, CommentDraft, CommentView, CurrentActorContext, Error, NewComment, Operation,
    RequestId,
};

/// Comment service implementing [`CommentThread`].
#[derive(Clone)]
pub struct CommentThreadService<C, R> {
    comments: Arc<C>,
    requests: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<C, R> CommentThreadService<C, R> {
    /// Create a service over the comment and request repositories.
    pub fn new(comments: Arc<C>, requests: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            comments,
            requests,
            clock,
        }
    }
}

#[async_trait]
impl<C, R> CommentThread for CommentThreadService<C, R>
where
    C: CommentRepository,
    R: RequestRepository,
{
    async fn add(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        draft: CommentDraft,
    ) -> Result<Comment, Error> {
        actor.require(Operation::AddComment)?;
        let new_comment =
            NewComment::from_draft(&draft, request_id, actor.user_id(), self.clock.utc())
                .map_err(|err| Error::invalid_request(err.to_string()))?;
        find_visible_request(self.requests.as_ref(), actor, request_id).await?;

        let comment = self
            .comments
            .append(&new_comment)
            .await
            .map_err(map_comment_error)?;
        info!(
            request_id = %request_id,
            comment_id = comment.id,
            author = %actor.user_id(),
            technical = comment.is_technical_note,
            "comment added"
        );
        Ok(comment)
    }

    async fn list(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
    ) -> Result<Vec<CommentView>, Error> {
        find_visible_request(self.requests.as_ref(), actor, request_id).await?;
        retry_read("list_comments", move || {
            self.comments.list_for_request(request_id)
        })
        .await
        .map_err(map_comment_error)
    }
}

#[cfg(test)]
#[path = "comment_thread_service_tests.rs"]
mod tests;
