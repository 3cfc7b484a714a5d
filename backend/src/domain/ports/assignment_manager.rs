//! Driving port for technician assignment.

use async_trait::async_trait;

use crate::domain::{CurrentActorContext, Error, Request, RequestId, UserId};

/// Domain use-case port for assigning and unassigning technicians.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentManager: Send + Sync {
    /// Assign `technician` (stamping today's date) or clear the assignee
    /// when `None`.
    async fn assign(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        technician: Option<UserId>,
    ) -> Result<Request, Error>;
}
