//! Aggregate figures derived from stored requests.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Request, RequestStatus};

/// Number of requests for one equipment type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentTypeCount {
    pub equipment_type: String,
    pub count: u64,
}

/// Desk-wide summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub total_count: u64,
    pub completed_count: u64,
    /// Mean whole-day turnaround of completed requests, two decimals; `0`
    /// when nothing has been completed.
    pub average_completion_days: f64,
    /// All requests grouped by equipment type, largest group first.
    pub per_equipment_type_counts: Vec<EquipmentTypeCount>,
}

impl StatisticsSummary {
    /// Compute the summary over `requests`.
    ///
    /// # Examples
    /// ```
    /// use repair_desk::domain::StatisticsSummary;
    ///
    /// let summary = StatisticsSummary::from_requests(&[]);
    /// assert_eq!(summary.total_count, 0);
    /// assert_eq!(summary.average_completion_days, 0.0);
    /// ```
    #[must_use]
    pub fn from_requests(requests: &[Request]) -> Self {
        let completed_count = requests
            .iter()
            .filter(|request| request.status == RequestStatus::Completed)
            .count();

        Self {
            total_count: requests.len() as u64,
            completed_count: completed_count as u64,
            average_completion_days: average_completion_days(requests),
            per_equipment_type_counts: count_by_equipment_type(requests),
        }
    }
}

/// Mean of `completed_on - created_on` over completed requests with a
/// completion date, rounded to two decimals.
#[must_use]
pub fn average_completion_days(requests: &[Request]) -> f64 {
    let spans: Vec<i64> = requests
        .iter()
        .filter(|request| request.status == RequestStatus::Completed)
        .filter_map(|request| {
            request
                .completed_on
                .map(|completed| (completed - request.created_on).num_days())
        })
        .collect();

    if spans.is_empty() {
        return 0.0;
    }
    let mean = spans.iter().sum::<i64>() as f64 / spans.len() as f64;
    round_to(mean, 2)
}

/// Group by equipment type, descending by count, ties by type name.
#[must_use]
pub fn count_by_equipment_type(requests: &[Request]) -> Vec<EquipmentTypeCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for request in requests {
        *counts.entry(request.equipment_type.as_str()).or_default() += 1;
    }
    let mut grouped: Vec<EquipmentTypeCount> = counts
        .into_iter()
        .map(|(equipment_type, count)| EquipmentTypeCount {
            equipment_type: equipment_type.to_owned(),
            count,
        })
        .collect();
    // Stable sort keeps the BTreeMap's alphabetical order within equal counts.
    grouped.sort_by(|left, right| right.count.cmp(&left.count));
    grouped
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}
