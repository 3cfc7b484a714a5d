//! Audit records for request status changes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{RequestId, RequestStatus, Role, UserId};

/// Append-only record of one status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub id: i32,
    pub request_id: RequestId,
    /// Always populated for ledger-recorded changes; reserved as nullable
    /// for synthetic creation entries.
    pub old_status: Option<RequestStatus>,
    pub new_status: RequestStatus,
    pub changed_by: UserId,
    pub changed_at: DateTime<Utc>,
}

/// History entry joined with the acting user's name for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryView {
    #[serde(flatten)]
    pub entry: StatusHistoryEntry,
    pub changed_by_name: String,
    pub changed_by_role: Role,
}

/// Status change requested of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub request_id: RequestId,
    pub new_status: RequestStatus,
    pub changed_by: UserId,
    /// Calendar day used for the completion date.
    pub today: NaiveDate,
    pub at: DateTime<Utc>,
}

impl StatusChange {
    /// Completion date after applying this change.
    ///
    /// Entering `completed` stamps today; any other target clears it, which
    /// also covers leaving `completed`.
    #[must_use]
    pub fn completion_date(&self) -> Option<NaiveDate> {
        (self.new_status == RequestStatus::Completed).then_some(self.today)
    }
}

/// Result of a ledger transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// Target equals the current status; nothing was written.
    Unchanged { status: RequestStatus },
    /// Status updated and audit entry appended.
    Recorded { entry: StatusHistoryEntry },
}

impl TransitionOutcome {
    /// Legacy boolean view: whether anything changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(self, Self::Recorded { .. })
    }
}

/// Sort newest first, ties by descending id.
pub fn sort_history_newest_first(entries: &mut [StatusHistoryView]) {
    entries.sort_by(|left, right| {
        right
            .entry
            .changed_at
            .cmp(&left.entry.changed_at)
            .then_with(|| right.entry.id.cmp(&left.entry.id))
    });
}
