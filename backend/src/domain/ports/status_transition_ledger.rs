//! Driving port for status changes and their audit trail.

use async_trait::async_trait;

use crate::domain::{
    CurrentActorContext, Error, RequestId, RequestStatus, StatusHistoryView, TransitionOutcome,
};

/// Domain use-case port for the status ledger.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusTransitionLedger: Send + Sync {
    /// Move a request to `new_status`, recording exactly one history entry
    /// when the status actually changes.
    async fn transition(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
        new_status: RequestStatus,
    ) -> Result<TransitionOutcome, Error>;

    /// Status history of a visible request, newest first.
    async fn history(
        &self,
        actor: &CurrentActorContext,
        request_id: RequestId,
    ) -> Result<Vec<StatusHistoryView>, Error>;
}
