//! Driving port for request intake and lookup.
//!
//! Inbound adapters call [`RequestStore`] with the acting user's context;
//! implementations check permissions and visibility before touching storage.

use async_trait::async_trait;

use crate::domain::{CurrentActorContext, CustomerLookup, Error, Request, RequestDraft, RequestId};

/// Domain use-case port for repair requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// File a new request and allocate its number.
    ///
    /// # Errors
    ///
    /// `forbidden` without `create-request` (or `set-initial-state` when the
    /// draft carries an initial status or technician), `invalid_request` for
    /// blank fields, `not_found` for an unknown technician.
    async fn create(
        &self,
        actor: &CurrentActorContext,
        draft: RequestDraft,
    ) -> Result<Request, Error>;

    /// Fetch a request the actor is allowed to see.
    async fn get(&self, actor: &CurrentActorContext, id: RequestId) -> Result<Request, Error>;

    /// Every visible request, newest first.
    async fn list_all(&self, actor: &CurrentActorContext) -> Result<Vec<Request>, Error>;

    /// Visible requests whose number or customer name contains `term`.
    async fn search(&self, actor: &CurrentActorContext, term: &str)
    -> Result<Vec<Request>, Error>;

    /// Requests filed for a customer.
    async fn list_by_customer(
        &self,
        actor: &CurrentActorContext,
        customer: &CustomerLookup,
    ) -> Result<Vec<Request>, Error>;

    /// Open requests assigned to the acting technician, in work order.
    async fn list_assigned_tasks(
        &self,
        actor: &CurrentActorContext,
    ) -> Result<Vec<Request>, Error>;
}
