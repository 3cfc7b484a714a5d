//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AssignmentManager, AuthenticationGateway, CommentRepository, CommentThread, QualityDesk,
    RequestRepository, RequestStore, StatisticsAggregator, StatusLedgerRepository,
    StatusTransitionLedger, UserDirectory, UserRepository,
};
use crate::domain::{
    AssignmentService, AuthenticationService, CommentThreadService, QualityDeskService,
    RequestStoreService, StatisticsService, StatusLedgerService, UserDirectoryService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn AuthenticationGateway>,
    pub requests: Arc<dyn RequestStore>,
    pub ledger: Arc<dyn StatusTransitionLedger>,
    pub assignments: Arc<dyn AssignmentManager>,
    pub comments: Arc<dyn CommentThread>,
    pub statistics: Arc<dyn StatisticsAggregator>,
    pub quality: Arc<dyn QualityDesk>,
    pub users: Arc<dyn UserDirectory>,
}

/// Driven adapters the services are built over.
pub struct Repositories<U, R, L, C> {
    pub users: Arc<U>,
    pub requests: Arc<R>,
    pub ledger: Arc<L>,
    pub comments: Arc<C>,
}

impl HttpState {
    /// Wire every domain service over one set of repositories.
    ///
    /// The PostgreSQL server and the in-memory test harness both go through
    /// here, so handlers always see the same service graph.
    pub fn from_repositories<U, R, L, C>(
        repositories: Repositories<U, R, L, C>,
        clock: Arc<dyn Clock>,
        overdue_after_days: u32,
    ) -> Self
    where
        U: UserRepository + 'static,
        R: RequestRepository + 'static,
        L: StatusLedgerRepository + 'static,
        C: CommentRepository + 'static,
    {
        let Repositories {
            users,
            requests,
            ledger,
            comments,
        } = repositories;

        let auth: Arc<dyn AuthenticationGateway> =
            Arc::new(AuthenticationService::new(users.clone()));

        Self {
            auth: auth.clone(),
            requests: Arc::new(RequestStoreService::new(requests.clone(), clock.clone())),
            ledger: Arc::new(StatusLedgerService::new(
                ledger,
                requests.clone(),
                clock.clone(),
            )),
            assignments: Arc::new(AssignmentService::new(requests.clone(), clock.clone())),
            comments: Arc::new(CommentThreadService::new(
                comments.clone(),
                requests.clone(),
                clock.clone(),
            )),
            statistics: Arc::new(StatisticsService::new(requests.clone())),
            quality: Arc::new(QualityDeskService::new(
                requests,
                users.clone(),
                comments,
                clock.clone(),
                overdue_after_days,
            )),
            users: Arc::new(UserDirectoryService::new(users, auth, clock)),
        }
    }
}
