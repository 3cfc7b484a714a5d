//! Role capability matrix.
//!
//! Every role check in the crate goes through [`PermissionModel::authorize`].
//! The table below is the single source of truth; services never compare
//! roles directly.

use std::fmt;

use serde::Serialize;

use super::Role;

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Register a new repair request.
    CreateRequest,
    /// Choose a non-default initial status or technician at creation.
    SetInitialState,
    /// Read requests filed under the caller's own name.
    ViewOwnRequests,
    /// Read every request.
    ViewAllRequests,
    /// Read the caller's own open assignments.
    ViewAssignedTasks,
    /// Move a request to another status.
    EditStatus,
    /// Assign or unassign a technician.
    AssignTechnician,
    /// Register a staff or customer account.
    CreateUser,
    /// Change an account's role, name, phone, or password.
    EditUser,
    /// Remove an account and everything it authored.
    DeleteUser,
    /// Read the account directory.
    ViewUsers,
    /// List technicians for assignment.
    ViewTechnicians,
    /// Read the operational statistics summary.
    ViewStatistics,
    /// Comment on a visible request.
    AddComment,
    /// Read the stalled-work overview.
    ViewQualityTools,
    /// Record an agreed deadline extension.
    ExtendDeadline,
    /// Record that an extra technician was brought in.
    EngageSpecialist,
}

impl Operation {
    /// Kebab-case name used in messages and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateRequest => "create-request",
            Self::SetInitialState => "set-initial-state",
            Self::ViewOwnRequests => "view-own-requests",
            Self::ViewAllRequests => "view-all-requests",
            Self::ViewAssignedTasks => "view-assigned-tasks",
            Self::EditStatus => "edit-status",
            Self::AssignTechnician => "assign-technician",
            Self::CreateUser => "create-user",
            Self::EditUser => "edit-user",
            Self::DeleteUser => "delete-user",
            Self::ViewUsers => "view-users",
            Self::ViewTechnicians => "view-technicians",
            Self::ViewStatistics => "view-statistics",
            Self::AddComment => "add-comment",
            Self::ViewQualityTools => "view-quality-tools",
            Self::ExtendDeadline => "extend-deadline",
            Self::EngageSpecialist => "engage-specialist",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

use Operation::{
    AddComment, AssignTechnician, CreateRequest, CreateUser, DeleteUser, EditStatus, EditUser,
    EngageSpecialist, ExtendDeadline, SetInitialState, ViewAllRequests, ViewAssignedTasks,
    ViewOwnRequests, ViewQualityTools, ViewStatistics, ViewTechnicians, ViewUsers,
};

const CUSTOMER: &[Operation] = &[CreateRequest, ViewOwnRequests, AddComment];

const TECHNICIAN: &[Operation] = &[
    ViewOwnRequests,
    ViewAllRequests,
    ViewAssignedTasks,
    EditStatus,
    AddComment,
];

const OPERATOR: &[Operation] = &[
    CreateRequest,
    ViewOwnRequests,
    ViewAllRequests,
    EditStatus,
    AddComment,
];

const QUALITY_MANAGER: &[Operation] = &[
    ViewOwnRequests,
    ViewAllRequests,
    ViewTechnicians,
    AddComment,
    ViewQualityTools,
    ExtendDeadline,
    EngageSpecialist,
];

const MANAGER: &[Operation] = &[
    CreateRequest,
    SetInitialState,
    ViewOwnRequests,
    ViewAllRequests,
    EditStatus,
    AssignTechnician,
    ViewTechnicians,
    ViewStatistics,
    AddComment,
];

const ADMINISTRATOR: &[Operation] = &[
    CreateRequest,
    SetInitialState,
    ViewOwnRequests,
    ViewAllRequests,
    ViewAssignedTasks,
    EditStatus,
    AssignTechnician,
    CreateUser,
    EditUser,
    DeleteUser,
    ViewUsers,
    ViewTechnicians,
    ViewStatistics,
    AddComment,
    ViewQualityTools,
    ExtendDeadline,
    EngageSpecialist,
];

/// Static role → operations table.
///
/// # Examples
/// ```
/// use repair_desk::domain::{Operation, PermissionModel, Role};
///
/// assert!(!PermissionModel::authorize(Role::Customer, Operation::AssignTechnician));
/// assert!(PermissionModel::authorize(Role::Administrator, Operation::AssignTechnician));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionModel;

impl PermissionModel {
    /// Operations granted to `role`.
    #[must_use]
    pub const fn allowed_operations(role: Role) -> &'static [Operation] {
        match role {
            Role::Customer => CUSTOMER,
            Role::Technician => TECHNICIAN,
            Role::Operator => OPERATOR,
            Role::QualityManager => QUALITY_MANAGER,
            Role::Manager => MANAGER,
            Role::Administrator => ADMINISTRATOR,
        }
    }

    /// Whether `role` may perform `operation`. Anything not listed is denied.
    #[must_use]
    pub fn authorize(role: Role, operation: Operation) -> bool {
        Self::allowed_operations(role).contains(&operation)
    }
}
