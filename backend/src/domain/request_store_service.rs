//! Request intake and lookup service.
//!
//! Implements [`RequestStore`] over a [`RequestRepository`]. Permission checks
//! happen before any storage access; Customers are confined to requests filed
//! under their own name and see every other request as missing.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use super::repository_errors::{map_request_error, retry_read};
use crate::domain::ports::{RequestRepository, RequestRepositoryError, RequestStore};
use crate::domain::{
    CurrentActorContext, CustomerLookup, Error, NewRequest, Operation, Request, RequestDraft,
    RequestId, RequestStatus, RequestValidationError, sort_by_work_priority,
};

/// Request service implementing the [`RequestStore`] driving port.
#[derive(Clone)]
pub struct RequestStoreService<R> {
    requests: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> RequestStoreService<R> {
    /// Create a service over `requests` using `clock` for creation dates.
    pub fn new(requests: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { requests, clock }
    }
}

fn validation_error(error: &RequestValidationError) -> Error {
    let details = match error {
        RequestValidationError::MissingField(field) => json!({
            "field": field.name(),
            "code": "missing_field",
        }),
        RequestValidationError::InitialStatusNotAllowed(status) => json!({
            "field": "initialStatus",
            "value": status.as_str(),
            "code": "initial_status_not_allowed",
        }),
    };
    Error::invalid_request(error.to_string()).with_details(details)
}

fn own_lookup(actor: &CurrentActorContext) -> CustomerLookup {
    CustomerLookup {
        name: actor.full_name().as_ref().to_owned(),
        phone: actor.phone().map(str::to_owned),
    }
}

/// Load a request the actor may see; anything else reads as missing.
pub(crate) async fn find_visible_request<R>(
    requests: &R,
    actor: &CurrentActorContext,
    id: RequestId,
) -> Result<Request, Error>
where
    R: RequestRepository,
{
    if !actor.can(Operation::ViewAllRequests) {
        actor.require(Operation::ViewOwnRequests)?;
    }
    let found = retry_read("find_request", move || requests.find_by_id(id))
        .await
        .map_err(map_request_error)?;
    found
        .filter(|request| actor.can_see(request))
        .ok_or_else(|| Error::not_found(format!("request {id} not found")))
}

impl<R> RequestStoreService<R>
where
    R: RequestRepository,
{
    fn requires_own_scope(actor: &CurrentActorContext) -> Result<bool, Error> {
        if actor.can(Operation::ViewAllRequests) {
            return Ok(false);
        }
        actor.require(Operation::ViewOwnRequests)?;
        Ok(true)
    }

    async fn fetch_own_requests(
        &self,
        customer: &CustomerLookup,
    ) -> Result<Vec<Request>, Error> {
        retry_read("list_by_customer", move || self.requests.list_by_customer(customer))
            .await
            .map_err(map_request_error)
    }
}

#[async_trait]
impl<R> RequestStore for RequestStoreService<R>
where
    R: RequestRepository,
{
    async fn create(
        &self,
        actor: &CurrentActorContext,
        draft: RequestDraft,
    ) -> Result<Request, Error> {
        actor.require(Operation::CreateRequest)?;
        let new_request = NewRequest::try_from(draft).map_err(|err| validation_error(&err))?;
        if new_request.sets_initial_state() {
            actor.require(Operation::SetInitialState)?;
        }

        let today = self.clock.utc().date_naive();
        let created = match self.requests.create(&new_request, today).await {
            Err(RequestRepositoryError::DuplicateNumber { number }) => {
                warn!(%number, "request number collision, retrying allocation once");
                self.requests.create(&new_request, today).await
            }
            other => other,
        }
        .map_err(map_request_error)?;

        info!(
            request_id = %created.id,
            number = %created.number,
            created_by = %actor.user_id(),
            "request created"
        );
        Ok(created)
    }

    async fn get(&self, actor: &CurrentActorContext, id: RequestId) -> Result<Request, Error> {
        find_visible_request(self.requests.as_ref(), actor, id).await
    }

    async fn list_all(&self, actor: &CurrentActorContext) -> Result<Vec<Request>, Error> {
        if Self::requires_own_scope(actor)? {
            return self.fetch_own_requests(&own_lookup(actor)).await;
        }
        retry_read("list_requests", move || self.requests.list_all())
            .await
            .map_err(map_request_error)
    }

    async fn search(
        &self,
        actor: &CurrentActorContext,
        term: &str,
    ) -> Result<Vec<Request>, Error> {
        let term = term.trim();
        if term.is_empty() {
            return self.list_all(actor).await;
        }
        if Self::requires_own_scope(actor)? {
            let own = self.fetch_own_requests(&own_lookup(actor)).await?;
            return Ok(own
                .into_iter()
                .filter(|request| request.matches_term(term))
                .collect());
        }
        retry_read("search_requests", move || self.requests.search(term))
            .await
            .map_err(map_request_error)
    }

    async fn list_by_customer(
        &self,
        actor: &CurrentActorContext,
        customer: &CustomerLookup,
    ) -> Result<Vec<Request>, Error> {
        if Self::requires_own_scope(actor)? {
            return self.fetch_own_requests(&own_lookup(actor)).await;
        }
        self.fetch_own_requests(customer).await
    }

    async fn list_assigned_tasks(
        &self,
        actor: &CurrentActorContext,
    ) -> Result<Vec<Request>, Error> {
        actor.require(Operation::ViewAssignedTasks)?;
        let user_id = actor.user_id();
        let mut tasks: Vec<Request> =
            retry_read("list_assigned", move || self.requests.list_assigned_to(user_id))
                .await
                .map_err(map_request_error)?
                .into_iter()
                .filter(|request| request.status != RequestStatus::Completed)
                .collect();
        sort_by_work_priority(&mut tasks);
        Ok(tasks)
    }
}

#[cfg(test)]
#[path = "request_store_service_tests.rs"]
mod tests;
