//! Status transition service.
//!
//! Delegates the locked update-plus-audit write to a
//! [`StatusLedgerRepository`]; this layer only decides who may transition and
//! who may read a request's history.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::repository_errors::{map_ledger_error, retry_read};
use super::request_store_service::find_visible_request;
use crate::domain::ports::{RequestRepository, StatusLedgerRepository, StatusTransitionLedger};
use crate::domain::{
    CurrentActorContext, Error, Operation, RequestId, RequestStatus, StatusChange,
    StatusHistoryView, TransitionOutcome,
};

/// Ledger service implementing [`StatusTransitionLedger`].
#[derive(Clone)]
pub struct StatusLedgerService<L, R> {
    ledger: Arc<L>,
    requests: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<L, R> StatusLedgerService<L, R> {
    /// Create a service over the ledger and request repositories.
    pub fn new(ledger: Arc<L>, requests: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger,
            requests,
            clock,
        }
    }
}

#[async_trait]
impl<L, R> StatusTransitionLedger for StatusLedgerService<L, R>
where
    L: StatusLedgerRepository,
    R: RequestRepository,
{
    async fn transition(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        new_status: RequestStatus,
    ) -> Result<TransitionOutcome, Error> {
        actor.require(Operation::EditStatus)?;
        let now = self.clock.utc();
        let change = StatusChange {
            request_id,
            new_status,
            changed_by: actor.user_id(),
            today: now.date_naive(),
            at: now,
        };
        let outcome = self
            .ledger
            .transition(&change)
            .await
            .map_err(map_ledger_error)?;

        match &outcome {
            TransitionOutcome::Recorded { entry } => info!(
                request_id = %request_id,
                old_status = ?entry.old_status,
                new_status = %entry.new_status,
                changed_by = %actor.user_id(),
                "status changed"
            ),
            TransitionOutcome::Unchanged { status } => info!(
                request_id = %request_id,
                status = %status,
                "status unchanged, nothing recorded"
            ),
        }
        Ok(outcome)
    }

    async fn history(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
    ) -> Result<Vec<StatusHistoryView>, Error> {
        find_visible_request(self.requests.as_ref(), actor, request_id).await?;
        retry_read("status_history", move || self.ledger.history(request_id))
            .await
            .map_err(map_ledger_error)
    }
}

#[cfg(test)]
#[path = "status_ledger_service_tests.rs"]
mod tests;
