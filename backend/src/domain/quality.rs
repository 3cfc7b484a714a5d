//! Stalled-work detection for quality review.

use chrono::NaiveDate;
use serde::Serialize;

use super::statistics::round_to;
use super::{Request, RequestStatus};

/// Default age, in days, after which open work counts as overdue.
pub const DEFAULT_OVERDUE_AFTER_DAYS: u32 = 3;
/// Days a finished repair may wait for pickup before it is flagged.
pub const PICKUP_WAIT_LIMIT_DAYS: i64 = 5;

/// Why a request was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProblemKind {
    /// New or in repair for longer than the threshold.
    Overdue { days_overdue: i64 },
    /// Ready but not collected since assignment.
    AwaitingPickup { days_waiting: i64 },
}

/// Flagged request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRequest {
    pub request: Request,
    pub problem: ProblemKind,
}

/// Share of flagged requests for one equipment type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentProblemShare {
    pub equipment_type: String,
    pub total: u64,
    pub problems: u64,
    /// Percentage with one decimal.
    pub problem_percent: f64,
}

/// Quality overview returned to quality managers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityOverview {
    pub overdue_after_days: u32,
    pub overdue_count: u64,
    pub awaiting_pickup_count: u64,
    pub problems: Vec<ProblemRequest>,
    pub per_equipment_type: Vec<EquipmentProblemShare>,
}

/// Classify one request as of `today`.
#[must_use]
pub fn classify(request: &Request, today: NaiveDate, overdue_after_days: u32) -> Option<ProblemKind> {
    match request.status {
        RequestStatus::New | RequestStatus::InRepair => {
            let age = (today - request.created_on).num_days();
            let days_overdue = age - i64::from(overdue_after_days);
            (days_overdue > 0).then_some(ProblemKind::Overdue { days_overdue })
        }
        RequestStatus::ReadyForPickup => {
            let waiting = (today - request.assigned_on?).num_days();
            (waiting > PICKUP_WAIT_LIMIT_DAYS).then_some(ProblemKind::AwaitingPickup {
                days_waiting: waiting,
            })
        }
        RequestStatus::Completed => None,
    }
}

impl QualityOverview {
    /// Build the overview over every stored request.
    #[must_use]
    pub fn from_requests(requests: &[Request], today: NaiveDate, overdue_after_days: u32) -> Self {
        let problems: Vec<ProblemRequest> = requests
            .iter()
            .filter_map(|request| {
                classify(request, today, overdue_after_days).map(|problem| ProblemRequest {
                    request: request.clone(),
                    problem,
                })
            })
            .collect();

        let overdue_count = problems
            .iter()
            .filter(|p| matches!(p.problem, ProblemKind::Overdue { .. }))
            .count() as u64;
        let awaiting_pickup_count = problems.len() as u64 - overdue_count;

        Self {
            overdue_after_days,
            overdue_count,
            awaiting_pickup_count,
            per_equipment_type: problem_shares(requests, &problems),
            problems,
        }
    }
}

fn problem_shares(requests: &[Request], problems: &[ProblemRequest]) -> Vec<EquipmentProblemShare> {
    let mut shares: Vec<EquipmentProblemShare> = super::statistics::count_by_equipment_type(requests)
        .into_iter()
        .map(|group| {
            let flagged = problems
                .iter()
                .filter(|p| p.request.equipment_type == group.equipment_type)
                .count() as u64;
            let percent = if group.count == 0 {
                0.0
            } else {
                round_to(flagged as f64 * 100.0 / group.count as f64, 1)
            };
            EquipmentProblemShare {
                equipment_type: group.equipment_type,
                total: group.count,
                problems: flagged,
                problem_percent: percent,
            }
        })
        .collect();
    shares.sort_by(|left, right| right.problems.cmp(&left.problems));
    shares
}
