//! Port for request persistence: intake, lookup, listing, assignment.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{CustomerLookup, NewRequest, Request, RequestId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by request repository adapters.
    pub enum RequestRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "request repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "request repository query failed: {message}",
        /// Two creates raced for the same request number.
        DuplicateNumber { number: String } => "request number already allocated: {number}",
        /// A referenced user does not exist.
        UnknownUser { user_id: i32 } => "user {user_id} does not exist",
    }
}

/// Port for the request store and assignment writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Allocate the next number in `created_on`'s year and insert the
    /// request, atomically with respect to other creates in that year.
    async fn create(
        &self,
        request: &NewRequest,
        created_on: NaiveDate,
    ) -> Result<Request, RequestRepositoryError>;

    /// Look a request up by id.
    async fn find_by_id(&self, id: RequestId) -> Result<Option<Request>, RequestRepositoryError>;

    /// Every request, newest creation date first, ties by descending id.
    async fn list_all(&self) -> Result<Vec<Request>, RequestRepositoryError>;

    /// Case-insensitive substring match on number or customer name, same order.
    async fn search(&self, term: &str) -> Result<Vec<Request>, RequestRepositoryError>;

    /// Requests filed for a customer, same order.
    async fn list_by_customer(
        &self,
        customer: &CustomerLookup,
    ) -> Result<Vec<Request>, RequestRepositoryError>;

    /// Requests currently assigned to a user, any status.
    async fn list_assigned_to(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Request>, RequestRepositoryError>;

    /// Set or clear the assignee and assignment date; `None` when the
    /// request does not exist.
    async fn assign(
        &self,
        id: RequestId,
        assignee: Option<UserId>,
        assigned_on: Option<NaiveDate>,
    ) -> Result<Option<Request>, RequestRepositoryError>;
}
