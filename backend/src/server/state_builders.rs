//! Builds the HTTP state over the Diesel repositories.

use std::sync::Arc;

use mockable::DefaultClock;
use repair_desk::inbound::http::state::{HttpState, Repositories};
use repair_desk::outbound::persistence::{
    DbPool, DieselCommentRepository, DieselRequestRepository, DieselStatusLedgerRepository,
    DieselUserRepository,
};

/// One repository per port, all sharing `pool`.
pub(crate) fn build_http_state(pool: &DbPool, overdue_after_days: u32) -> HttpState {
    HttpState::from_repositories(
        Repositories {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            requests: Arc::new(DieselRequestRepository::new(pool.clone())),
            ledger: Arc::new(DieselStatusLedgerRepository::new(pool.clone())),
            comments: Arc::new(DieselCommentRepository::new(pool.clone())),
        },
        Arc::new(DefaultClock),
        overdue_after_days,
    )
}
