//! Statistics service.

use std::sync::Arc;

use async_trait::async_trait;

use super::repository_errors::{map_request_error, retry_read};
use crate::domain::ports::{RequestRepository, StatisticsAggregator};
use crate::domain::{CurrentActorContext, Error, Operation, StatisticsSummary};

/// Read-only aggregator implementing [`StatisticsAggregator`].
#[derive(Clone)]
pub struct StatisticsService<R> {
    requests: Arc<R>,
}

impl<R> StatisticsService<R> {
    /// Create a service reading from `requests`.
    pub fn new(requests: Arc<R>) -> Self {
        Self { requests }
    }
}

#[async_trait]
impl<R> StatisticsAggregator for StatisticsService<R>
where
    R: RequestRepository,
{
    async fn summary(&self, actor: &CurrentActorContext) -> Result<StatisticsSummary, Error> {
        actor.require(Operation::ViewStatistics)?;
        let requests = retry_read("statistics_requests", move || self.requests.list_all())
            .await
            .map_err(map_request_error)?;
        Ok(StatisticsSummary::from_requests(&requests))
    }
}
