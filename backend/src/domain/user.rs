//! User identity, roles, and validated profile fields.
//!
//! Purpose: give every layer the same typed view of a staff member or
//! customer account. Raw strings from HTTP payloads become [`UserDraft`] and
//! are validated into [`NewUser`] before a repository sees them.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::auth::{PasswordDigest, PasswordHashError};

/// Maximum accepted username length.
pub const USERNAME_MAX: usize = 64;

/// Numeric user identifier assigned by storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of account roles.
///
/// Stored as the snake_case code returned by [`Role::as_str`]; the storage
/// schema enforces the same set with a CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access including user administration.
    Administrator,
    /// Runs the desk: intake, assignment, statistics.
    Manager,
    /// Reviews stalled work and negotiates deadlines.
    QualityManager,
    /// Performs repairs and progresses request status.
    Technician,
    /// Front desk intake.
    Operator,
    /// Equipment owner; sees only their own requests.
    Customer,
}

impl Role {
    /// Every role, in directory display order.
    pub const ALL: [Self; 6] = [
        Self::Administrator,
        Self::Manager,
        Self::QualityManager,
        Self::Technician,
        Self::Operator,
        Self::Customer,
    ];

    /// Storage and wire code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Manager => "manager",
            Self::QualityManager => "quality_manager",
            Self::Technician => "technician",
            Self::Operator => "operator",
            Self::Customer => "customer",
        }
    }

    /// Position in user listings; lower sorts first.
    #[must_use]
    pub const fn directory_rank(self) -> u8 {
        match self {
            Self::Administrator => 1,
            Self::Manager => 2,
            Self::QualityManager => 3,
            Self::Technician => 4,
            Self::Operator => 5,
            Self::Customer => 6,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or submitted role code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| UnknownRole(value.to_owned()))
    }
}

/// Validation errors for user profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Username exceeded `max` characters.
    UsernameTooLong { max: usize },
    /// Username contained whitespace.
    UsernameWhitespace,
    /// Full name was missing or blank.
    EmptyFullName,
    /// Password was empty.
    EmptyPassword,
    /// Password was rejected by the digest algorithm.
    UnhashablePassword(PasswordHashError),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameWhitespace => write!(f, "username must not contain whitespace"),
            Self::EmptyFullName => write!(f, "full name must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::UnhashablePassword(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Login name, unique across accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a username.
    ///
    /// # Examples
    /// ```
    /// use repair_desk::domain::Username;
    ///
    /// assert!(Username::new("tech").is_ok());
    /// assert!(Username::new("two words").is_err());
    /// ```
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::UsernameWhitespace);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Person's display name, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    /// Validate and construct a full name.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FullName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

/// Normalise an optional phone: trimmed, blank treated as absent.
#[must_use]
pub fn normalize_phone(phone: Option<&str>) -> Option<String> {
    phone
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Application user.
///
/// The password digest never travels with this type; authentication reads it
/// separately through [`crate::domain::ports::StoredCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub role: Role,
    pub full_name: FullName,
    pub phone: Option<String>,
    pub created_on: NaiveDate,
}

/// Unvalidated account fields as submitted by an administrator.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: String,
    pub password: Zeroizing<String>,
    pub role: Role,
    pub full_name: String,
    pub phone: Option<String>,
}

/// Validated account awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub password_digest: PasswordDigest,
    pub role: Role,
    pub full_name: FullName,
    pub phone: Option<String>,
    pub created_on: NaiveDate,
}

impl NewUser {
    /// Validate a draft, then digest its password with `hash`.
    ///
    /// `hash` is only called once every other field is valid.
    pub fn from_draft(
        draft: &UserDraft,
        created_on: NaiveDate,
        hash: impl FnOnce(&str) -> Result<PasswordDigest, PasswordHashError>,
    ) -> Result<Self, UserValidationError> {
        let username = Username::new(&draft.username)?;
        let full_name = FullName::new(&draft.full_name)?;
        if draft.password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self {
            username,
            password_digest: hash(draft.password.as_str())
                .map_err(UserValidationError::UnhashablePassword)?,
            role: draft.role,
            full_name,
            phone: normalize_phone(draft.phone.as_deref()),
            created_on,
        })
    }
}

/// Unvalidated profile edit. The username is immutable after creation.
#[derive(Debug, Clone)]
pub struct UserProfileDraft {
    pub role: Role,
    pub full_name: String,
    pub phone: Option<String>,
    /// Replaces the password when present and non-empty.
    pub new_password: Option<Zeroizing<String>>,
}

/// Validated profile edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub role: Role,
    pub full_name: FullName,
    pub phone: Option<String>,
    pub password_digest: Option<PasswordDigest>,
}

impl UserChanges {
    /// Validate an edit; a non-empty new password is digested with `hash`.
    pub fn from_draft(
        draft: &UserProfileDraft,
        hash: impl FnOnce(&str) -> Result<PasswordDigest, PasswordHashError>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            role: draft.role,
            full_name: FullName::new(&draft.full_name)?,
            phone: normalize_phone(draft.phone.as_deref()),
            password_digest: draft
                .new_password
                .as_ref()
                .filter(|password| !password.is_empty())
                .map(|password| hash(password.as_str()))
                .transpose()
                .map_err(UserValidationError::UnhashablePassword)?,
        })
    }
}

/// Sort users for the administrative directory: by role rank, then name.
pub fn sort_for_directory(users: &mut [User]) {
    users.sort_by(|left, right| {
        left.role
            .directory_rank()
            .cmp(&right.role.directory_rank())
            .then_with(|| left.full_name.as_ref().cmp(right.full_name.as_ref()))
    });
}
