//! Driving port for quality-control tooling.
//!
//! Deadline extensions and specialist engagements are recorded as technical
//! comments on the request so they show up in the normal thread.

use async_trait::async_trait;

use crate::domain::{
    Comment, CurrentActorContext, DeadlineExtension, Error, ProblemRequest, QualityOverview,
    RequestId, SpecialistEngagement,
};

/// Domain use-case port for the quality manager's tools.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QualityDesk: Send + Sync {
    /// Overdue and awaiting-pickup requests as of today.
    async fn problem_requests(
        &self,
        actor: &CurrentActorContext,
    ) -> Result<Vec<ProblemRequest>, Error>;

    /// Problem requests plus counts and per-equipment problem share.
    async fn overview(&self, actor: &CurrentActorContext) -> Result<QualityOverview, Error>;

    /// Record an agreed deadline extension.
    async fn extend_deadline(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        extension: DeadlineExtension,
    ) -> Result<Comment, Error>;

    /// Record that another technician was brought in.
    async fn engage_specialist(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        engagement: SpecialistEngagement,
    ) -> Result<Comment, Error>;
}
