//! Technician assignment service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::repository_errors::map_request_error;
use crate::domain::ports::{AssignmentManager, RequestRepository};
use crate::domain::{CurrentActorContext, Error, Operation, Request, RequestId, UserId};

/// Assignment service implementing [`AssignmentManager`].
///
/// The target user's role is not checked here; any existing user id is
/// accepted.
#[derive(Clone)]
pub struct AssignmentService<R> {
    requests: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> AssignmentService<R> {
    /// Create a service over `requests`.
    pub fn new(requests: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { requests, clock }
    }
}

#[async_trait]
impl<R> AssignmentManager for AssignmentService<R>
where
    R: RequestRepository,
{
    async fn assign(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        technician: Option<UserId>,
    ) -> Result<Request, Error> {
        actor.require(Operation::AssignTechnician)?;
        let assigned_on = technician.map(|_| self.clock.utc().date_naive());
        let updated = self
            .requests
            .assign(request_id, technician, assigned_on)
            .await
            .map_err(map_request_error)?
            .ok_or_else(|| Error::not_found(format!("request {request_id} not found")))?;

        match technician {
            Some(user_id) => info!(
                request_id = %request_id,
                technician = %user_id,
                assigned_by = %actor.user_id(),
                "technician assigned"
            ),
            None => info!(request_id = %request_id, "technician unassigned"),
        }
        Ok(updated)
    }
}

#[cfg(test)]
#[path = "assignment_service_tests.rs"]
mod tests;
