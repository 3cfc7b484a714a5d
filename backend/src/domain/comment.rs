//! Request comments and the annotated notes recorded through them.
//!
//! Deadline extensions and specialist engagements have no columns of their
//! own; they are stored as technical-note comments whose body is rendered
//! here, so the audit trail reads the same in every client.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{RequestId, Role, UserId};

/// Longest deadline extension, in days.
pub const MAX_EXTENSION_DAYS: u8 = 30;

/// Validation errors raised for comment input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidationError {
    /// Comment text was blank once trimmed.
    EmptyBody,
    /// Extension was zero or longer than [`MAX_EXTENSION_DAYS`].
    ExtensionOutOfRange { days: u8 },
    /// No reason was given for the extension or escalation.
    EmptyReason,
    /// Extension requested without the customer's agreement.
    CustomerAgreementMissing,
}

impl fmt::Display for CommentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBody => write!(f, "comment text must not be empty"),
            Self::ExtensionOutOfRange { days } => write!(
                f,
                "deadline extension must be between 1 and {MAX_EXTENSION_DAYS} days, got {days}"
            ),
            Self::EmptyReason => write!(f, "reason must not be empty"),
            Self::CustomerAgreementMissing => {
                write!(f, "deadline extension requires customer agreement")
            }
        }
    }
}

impl std::error::Error for CommentValidationError {}

/// Trimmed, non-empty comment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommentBody(String);

impl CommentBody {
    /// Validate comment text.
    pub fn new(value: impl AsRef<str>) -> Result<Self, CommentValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CommentValidationError::EmptyBody);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for CommentBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Stored comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i32,
    pub request_id: RequestId,
    pub author_id: UserId,
    pub body: CommentBody,
    pub is_technical_note: bool,
    pub parts_ordered: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author's name and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_name: String,
    pub author_role: Role,
}

/// Raw comment input.
#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub text: String,
    pub is_technical_note: bool,
    pub parts_ordered: Option<String>,
}

/// Validated comment awaiting insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub request_id: RequestId,
    pub author_id: UserId,
    pub body: CommentBody,
    pub is_technical_note: bool,
    pub parts_ordered: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    /// Validate a draft for `request_id`, authored by `author_id` at `created_at`.
    pub fn from_draft(
        draft: &CommentDraft,
        request_id: RequestId,
        author_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CommentValidationError> {
        Ok(Self {
            request_id,
            author_id,
            body: CommentBody::new(&draft.text)?,
            is_technical_note: draft.is_technical_note,
            parts_ordered: draft
                .parts_ordered
                .as_deref()
                .map(str::trim)
                .filter(|parts| !parts.is_empty())
                .map(str::to_owned),
            created_at,
        })
    }
}

/// Agreed postponement of a request's deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineExtension {
    days: u8,
    reason: String,
}

impl DeadlineExtension {
    /// Validate an extension: 1–30 days, a reason, and the customer's consent.
    ///
    /// # Examples
    /// ```
    /// use repair_desk::domain::DeadlineExtension;
    ///
    /// let ext = DeadlineExtension::new(5, "waiting for compressor", true).expect("valid");
    /// assert_eq!(ext.days(), 5);
    /// assert!(DeadlineExtension::new(31, "too long", true).is_err());
    /// ```
    pub fn new(
        days: u8,
        reason: impl AsRef<str>,
        customer_agreed: bool,
    ) -> Result<Self, CommentValidationError> {
        if !(1..=MAX_EXTENSION_DAYS).contains(&days) {
            return Err(CommentValidationError::ExtensionOutOfRange { days });
        }
        let reason = reason.as_ref().trim();
        if reason.is_empty() {
            return Err(CommentValidationError::EmptyReason);
        }
        if !customer_agreed {
            return Err(CommentValidationError::CustomerAgreementMissing);
        }
        Ok(Self {
            days,
            reason: reason.to_owned(),
        })
    }

    /// Extension length in days.
    #[must_use]
    pub fn days(&self) -> u8 {
        self.days
    }

    /// Comment text recording the extension.
    #[must_use]
    pub fn to_comment_text(&self) -> String {
        format!(
            "Deadline extended by {} day(s). Reason: {}. Customer agreement confirmed.",
            self.days, self.reason
        )
    }
}

/// Additional technician brought onto a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialistEngagement {
    pub specialist_id: UserId,
    reason: String,
}

impl SpecialistEngagement {
    /// Validate an engagement; the reason must not be blank.
    pub fn new(specialist_id: UserId, reason: impl AsRef<str>) -> Result<Self, CommentValidationError> {
        let reason = reason.as_ref().trim();
        if reason.is_empty() {
            return Err(CommentValidationError::EmptyReason);
        }
        Ok(Self {
            specialist_id,
            reason: reason.to_owned(),
        })
    }

    /// Comment text naming the specialist.
    #[must_use]
    pub fn to_comment_text(&self, specialist_name: &str) -> String {
        format!(
            "Additional specialist engaged: {specialist_name}. Reason: {}",
            self.reason
        )
    }
}
