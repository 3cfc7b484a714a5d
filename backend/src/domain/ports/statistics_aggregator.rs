//! Driving port for operational statistics.

use async_trait::async_trait;

use crate::domain::{CurrentActorContext, Error, StatisticsSummary};

/// Domain use-case port for read-only statistics.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatisticsAggregator: Send + Sync {
    /// Counts, completion average, and per-equipment breakdown.
    async fn summary(&self, actor: &CurrentActorContext) -> Result<StatisticsSummary, Error>;
}
