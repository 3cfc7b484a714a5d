//! Quality-control service: problem detection, deadline extensions, and
//! specialist engagement.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::repository_errors::{map_comment_error, map_request_error, map_user_error, retry_read};
use super::request_store_service::find_visible_request;
use crate::domain::ports::{CommentRepository, QualityDesk, RequestRepository, UserRepository};
use crate::domain::{
    Comment, CommentBody, CurrentActorContext, DeadlineExtension, Error, NewComment, Operation,
    ProblemRequest, QualityOverview, RequestId, Role, SpecialistEngagement,
};

/// Service implementing [`QualityDesk`].
#[derive(Clone)]
pub struct QualityDeskService<R, U, C> {
    requests: Arc<R>,
    users: Arc<U>,
    comments: Arc<C>,
    clock: Arc<dyn Clock>,
    overdue_after_days: u32,
}

impl<R, U, C> QualityDeskService<R, U, C> {
    /// Create a service flagging open work older than `overdue_after_days`.
    pub fn new(
        requests: Arc<R>,
        users: Arc<U>,
        comments: Arc<C>,
        clock: Arc<dyn Clock>,
        overdue_after_days: u32,
    ) -> Self {
        Self {
            requests,
            users,
            comments,
            clock,
            overdue_after_days,
        }
    }
}

impl<R, U, C> QualityDeskService<R, U, C>
where
    R: RequestRepository,
    U: UserRepository,
    C: CommentRepository,
{
    async fn record_note(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        text: String,
    ) -> Result<Comment, Error> {
        let body = CommentBody::new(text).map_err(|err| Error::internal(err.to_string()))?;
        let note = NewComment {
            request_id,
            author_id: actor.user_id(),
            body,
            is_technical_note: true,
            parts_ordered: None,
            created_at: self.clock.utc(),
        };
        self.comments.append(&note).await.map_err(map_comment_error)
    }
}

#[async_trait]
impl<R, U, C> QualityDesk for QualityDeskService<R, U, C>
where
    R: RequestRepository,
    U: UserRepository,
    C: CommentRepository,
{
    async fn problem_requests(
        &self,
        actor: &CurrentActorContext,
    ) -> Result<Vec<ProblemRequest>, Error> {
        Ok(self.overview(actor).await?.problems)
    }

    async fn overview(&self, actor: &CurrentActorContext) -> Result<QualityOverview, Error> {
        actor.require(Operation::ViewQualityTools)?;
        let requests = retry_read("quality_requests", move || self.requests.list_all())
            .await
            .map_err(map_request_error)?;
        Ok(QualityOverview::from_requests(
            &requests,
            self.clock.utc().date_naive(),
            self.overdue_after_days,
        ))
    }

    async fn extend_deadline(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        extension: DeadlineExtension,
    ) -> Result<Comment, Error> {
        actor.require(Operation::ExtendDeadline)?;
        find_visible_request(self.requests.as_ref(), actor, request_id).await?;
        let comment = self
            .record_note(actor, request_id, extension.to_comment_text())
            .await?;
        info!(
            request_id = %request_id,
            days = extension.days(),
            by = %actor.user_id(),
            "deadline extended"
        );
        Ok(comment)
    }

    async fn engage_specialist(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        engagement: SpecialistEngagement,
    ) -> Result<Comment, Error> {
        actor.require(Operation::EngageSpecialist)?;
        find_visible_request(self.requests.as_ref(), actor, request_id).await?;
        let specialist_id = engagement.specialist_id;
        let specialist = retry_read("find_specialist", move || {
            self.users.find_by_id(specialist_id)
        })
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| Error::not_found(format!("user {specialist_id} not found")))?;
        if specialist.role != Role::Technician {
            return Err(Error::invalid_request(format!(
                "user {specialist_id} is not a technician"
            )));
        }

        let comment = self
            .record_note(
                actor,
                request_id,
                engagement.to_comment_text(specialist.full_name.as_ref()),
            )
            .await?;
        info!(
            request_id = %request_id,
            specialist = %specialist_id,
            by = %actor.user_id(),
            "specialist engaged"
        );
        Ok(comment)
    }
}

#[cfg(test)]
#[path = "quality_desk_service_tests.rs"]
mod tests;
