//! Repair request entity, status enumeration, and request numbers.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Numeric request identifier assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(i32);

impl RequestId {
    /// Wrap a storage-assigned identifier.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw integer value for persistence adapters.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-facing request number, `REQ-<year>-<sequence>`.
///
/// The sequence is zero-padded to four digits and restarts at 1 each
/// calendar year.
///
/// # Examples
/// ```
/// use repair_desk::domain::RequestNumber;
///
/// let number = RequestNumber::new(2024, 1);
/// assert_eq!(number.to_string(), "REQ-2024-0001");
/// assert_eq!("REQ-2024-0001".parse::<RequestNumber>().expect("valid"), number);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestNumber {
    year: i32,
    sequence: u32,
}

impl RequestNumber {
    /// Build a number from its parts.
    #[must_use]
    pub const fn new(year: i32, sequence: u32) -> Self {
        Self { year, sequence }
    }

    /// Next number for `year` given how many requests that year already has.
    #[must_use]
    pub fn next_in_year(year: i32, existing_in_year: u32) -> Self {
        Self::new(year, existing_in_year.saturating_add(1))
    }

    /// Calendar year the number belongs to.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Position within the year, starting at 1.
    #[must_use]
    pub const fn sequence(self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for RequestNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "REQ-{}-{:04}", self.year, self.sequence)
    }
}

/// Raised when a stored request number does not follow the format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed request number: {0}")]
pub struct MalformedRequestNumber(pub String);

impl FromStr for RequestNumber {
    type Err = MalformedRequestNumber;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || MalformedRequestNumber(value.to_owned());
        let rest = value.strip_prefix("REQ-").ok_or_else(malformed)?;
        let (year, sequence) = rest.split_once('-').ok_or_else(malformed)?;
        if year.len() != 4 || sequence.len() < 4 {
            return Err(malformed());
        }
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let sequence = sequence.parse::<u32>().map_err(|_| malformed())?;
        if sequence == 0 {
            return Err(malformed());
        }
        Ok(Self::new(year, sequence))
    }
}

impl Serialize for RequestNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Lifecycle status of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Filed, not yet worked on.
    New,
    /// A technician is working on the equipment.
    InRepair,
    /// Repaired and waiting for the customer.
    ReadyForPickup,
    /// Closed; the completion date is set.
    Completed,
}

impl RequestStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::New,
        Self::InRepair,
        Self::ReadyForPickup,
        Self::Completed,
    ];

    /// Storage and wire code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InRepair => "in_repair",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::Completed => "completed",
        }
    }

    /// Statuses a request may be created with.
    #[must_use]
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::New | Self::InRepair)
    }

    /// Ordering key for a technician's open work: in-progress first.
    #[must_use]
    pub const fn work_priority(self) -> u8 {
        match self {
            Self::InRepair => 1,
            Self::ReadyForPickup => 2,
            Self::New => 3,
            Self::Completed => 4,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a status code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| UnknownStatus(value.to_owned()))
    }
}

/// Stored repair request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: RequestId,
    pub number: RequestNumber,
    pub created_on: NaiveDate,
    pub equipment_type: String,
    pub equipment_model: String,
    pub problem_description: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub status: RequestStatus,
    pub assigned_to: Option<UserId>,
    pub assigned_on: Option<NaiveDate>,
    pub completed_on: Option<NaiveDate>,
}

impl Request {
    /// Whether the request is filed for this customer.
    ///
    /// `(name AND phone) OR name`: the phone is advisory because it was
    /// recorded inconsistently across requests, so only the name decides.
    #[must_use]
    pub fn matches_customer(&self, lookup: &CustomerLookup) -> bool {
        self.customer_name == lookup.name
    }

    /// Whether this request matches a search term (case-insensitive
    /// substring of number or customer name). Blank terms match everything.
    #[must_use]
    pub fn matches_term(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty()
            || self.number.to_string().to_lowercase().contains(&needle)
            || self.customer_name.to_lowercase().contains(&needle)
    }
}

/// Sort newest creation date first, ties by descending id.
pub fn sort_newest_first(requests: &mut [Request]) {
    requests.sort_by(|left, right| {
        right
            .created_on
            .cmp(&left.created_on)
            .then_with(|| right.id.cmp(&left.id))
    });
}

/// Sort a technician's open work: status priority, then newest first.
pub fn sort_by_work_priority(requests: &mut [Request]) {
    requests.sort_by(|left, right| {
        left.status
            .work_priority()
            .cmp(&right.status.work_priority())
            .then_with(|| right.created_on.cmp(&left.created_on))
            .then_with(|| right.id.cmp(&left.id))
    });
}

/// Customer identity used to find their requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerLookup {
    pub name: String,
    pub phone: Option<String>,
}

/// Required request fields, named for validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    /// Kind of equipment, e.g. "Холодильник".
    EquipmentType,
    EquipmentModel,
    ProblemDescription,
    CustomerName,
    CustomerPhone,
}

impl RequestField {
    /// camelCase field name as seen by API clients.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EquipmentType => "equipmentType",
            Self::EquipmentModel => "equipmentModel",
            Self::ProblemDescription => "problemDescription",
            Self::CustomerName => "customerName",
            Self::CustomerPhone => "customerPhone",
        }
    }
}

/// Validation errors raised while building a [`NewRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    /// A required field was blank.
    MissingField(RequestField),
    /// Initial status outside `{new, in_repair}`.
    InitialStatusNotAllowed(RequestStatus),
}

impl fmt::Display for RequestValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{} must not be empty", field.name()),
            Self::InitialStatusNotAllowed(status) => {
                write!(f, "requests cannot be created with status {status}")
            }
        }
    }
}

impl std::error::Error for RequestValidationError {}

/// Unvalidated request intake payload.
#[derive(Debug, Clone, Default)]
pub struct RequestDraft {
    pub equipment_type: String,
    pub equipment_model: String,
    pub problem_description: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub initial_status: Option<RequestStatus>,
    pub assigned_to: Option<UserId>,
}

/// Validated request awaiting number allocation and insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    pub equipment_type: String,
    pub equipment_model: String,
    pub problem_description: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub status: RequestStatus,
    pub assigned_to: Option<UserId>,
}

impl NewRequest {
    /// Whether the draft asked for anything beyond the defaults.
    #[must_use]
    pub fn sets_initial_state(&self) -> bool {
        self.status != RequestStatus::New || self.assigned_to.is_some()
    }
}

fn required(value: &str, field: RequestField) -> Result<String, RequestValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(RequestValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_owned())
    }
}

impl TryFrom<RequestDraft> for NewRequest {
    type Error = RequestValidationError;

    fn try_from(draft: RequestDraft) -> Result<Self, Self::Error> {
        let status = draft.initial_status.unwrap_or(RequestStatus::New);
        if !status.is_initial() {
            return Err(RequestValidationError::InitialStatusNotAllowed(status));
        }
        Ok(Self {
            equipment_type: required(&draft.equipment_type, RequestField::EquipmentType)?,
            equipment_model: required(&draft.equipment_model, RequestField::EquipmentModel)?,
            problem_description: required(
                &draft.problem_description,
                RequestField::ProblemDescription,
            )?,
            customer_name: required(&draft.customer_name, RequestField::CustomerName)?,
            customer_phone: required(&draft.customer_phone, RequestField::CustomerPhone)?,
            status,
            assigned_to: draft.assigned_to,
        })
    }
}

/// Inclusive first and exclusive last day of the year containing `date`.
#[must_use]
pub fn year_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(date.year(), 1, 1)?;
    let end = NaiveDate::from_ymd_opt(date.year().checked_add(1)?, 1, 1)?;
    Some((start, end))
}
