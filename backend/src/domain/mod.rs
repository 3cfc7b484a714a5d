//! Domain primitives, aggregates, ports, and services.
//!
//! Purpose: model the repair desk (users, requests, the status ledger,
//! comments) with validated types, and implement the driving ports as
//! services over the driven repository ports. Nothing here reads ambient
//! session state; every operation receives a [`CurrentActorContext`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - User, Request, StatusHistoryEntry, Comment and their drafts.
//! - PermissionModel / Operation: the role capability matrix.
//! - `*Service` types implementing the ports in [`ports`].

mod actor;
mod assignment_service;
mod auth;
mod authentication_service;
mod comment;
mod comment_thread_service;
pub mod error;
mod permissions;
pub mod ports;
mod quality;
mod quality_desk_service;
mod repository_errors;
mod request;
mod request_store_service;
mod statistics;
mod statistics_service;
mod status_history;
mod status_ledger_service;
#[cfg(test)]
pub(crate) mod test_fixtures;
pub mod trace_id;
pub mod user;
mod user_directory_service;

pub use self::actor::CurrentActorContext;
pub use self::assignment_service::AssignmentService;
pub use self::auth::{LoginCredentials, LoginValidationError, PasswordDigest, PasswordHashError};
pub use self::authentication_service::AuthenticationService;
pub use self::comment::{
    Comment, CommentBody, CommentDraft, CommentValidationError, CommentView, DeadlineExtension,
    MAX_EXTENSION_DAYS, NewComment, SpecialistEngagement,
};
pub use self::comment_thread_service::CommentThreadService;
pub use self::error::{Error, ErrorCode};
pub use self::permissions::{Operation, PermissionModel};
pub use self::quality::{
    DEFAULT_OVERDUE_AFTER_DAYS, EquipmentProblemShare, PICKUP_WAIT_LIMIT_DAYS, ProblemKind,
    ProblemRequest, QualityOverview, classify,
};
pub use self::quality_desk_service::QualityDeskService;
pub use self::request::{
    CustomerLookup, MalformedRequestNumber, NewRequest, Request, RequestDraft, RequestField,
    RequestId, RequestNumber, RequestStatus, RequestValidationError, UnknownStatus,
    sort_by_work_priority, sort_newest_first, year_bounds,
};
pub use self::request_store_service::RequestStoreService;
pub use self::statistics::{
    EquipmentTypeCount, StatisticsSummary, average_completion_days, count_by_equipment_type,
};
pub use self::statistics_service::StatisticsService;
pub use self::status_history::{
    StatusChange, StatusHistoryEntry, StatusHistoryView, TransitionOutcome,
    sort_history_newest_first,
};
pub use self::status_ledger_service::StatusLedgerService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    FullName, NewUser, Role, USERNAME_MAX, UnknownRole, User, UserChanges, UserDraft, UserId,
    UserProfileDraft, UserValidationError, Username, normalize_phone, sort_for_directory,
};
pub use self::user_directory_service::UserDirectoryService;

