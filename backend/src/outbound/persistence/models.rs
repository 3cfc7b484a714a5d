//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types live next to
//! the rows so every adapter decodes stored codes the same way.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;

use crate::domain::{
    Comment, CommentBody, FullName, PasswordDigest, Request, RequestId, RequestNumber,
    RequestStatus, Role, StatusHistoryEntry, User, UserId, Username,
};

use super::schema::{comments, requests, status_history, users};

/// Raised when a stored row violates a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("corrupt {table} row {id}: {reason}")]
pub(crate) struct RowDecodeError {
    pub table: &'static str,
    pub id: i32,
    pub reason: String,
}

impl RowDecodeError {
    fn new(table: &'static str, id: i32, reason: impl ToString) -> Self {
        Self {
            table,
            id,
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub password_digest: String,
    pub role: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_on: NaiveDate,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, RowDecodeError> {
        Ok(User {
            id: UserId::new(self.id),
            username: Username::new(&self.username)
                .map_err(|err| RowDecodeError::new("users", self.id, err))?,
            role: self
                .role
                .parse::<Role>()
                .map_err(|err| RowDecodeError::new("users", self.id, err))?,
            full_name: FullName::new(&self.full_name)
                .map_err(|err| RowDecodeError::new("users", self.id, err))?,
            phone: self.phone,
            created_on: self.created_on,
        })
    }

    pub(crate) fn into_credentials(self) -> Result<(User, PasswordDigest), RowDecodeError> {
        let digest = PasswordDigest::from_stored(self.password_digest.clone());
        Ok((self.into_user()?, digest))
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub password_digest: &'a str,
    pub role: &'a str,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub created_on: NaiveDate,
}

/// Changeset for profile edits; `None` leaves the digest untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = false)]
pub(crate) struct UserProfileUpdate<'a> {
    pub role: &'a str,
    pub full_name: &'a str,
    pub password_digest: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Row struct for reading from the requests table.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RequestRow {
    pub id: i32,
    pub request_number: String,
    pub created_on: NaiveDate,
    pub equipment_type: String,
    pub equipment_model: String,
    pub problem_description: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub status: String,
    pub assigned_to: Option<i32>,
    pub assigned_on: Option<NaiveDate>,
    pub completed_on: Option<NaiveDate>,
}

impl RequestRow {
    pub(crate) fn into_request(self) -> Result<Request, RowDecodeError> {
        let number = self
            .request_number
            .parse::<RequestNumber>()
            .map_err(|err| RowDecodeError::new("requests", self.id, err))?;
        let status = self
            .status
            .parse::<RequestStatus>()
            .map_err(|err| RowDecodeError::new("requests", self.id, err))?;
        Ok(Request {
            id: RequestId::new(self.id),
            number,
            created_on: self.created_on,
            equipment_type: self.equipment_type,
            equipment_model: self.equipment_model,
            problem_description: self.problem_description,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            status,
            assigned_to: self.assigned_to.map(UserId::new),
            assigned_on: self.assigned_on,
            completed_on: self.completed_on,
        })
    }
}

/// Insertable struct for new requests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = requests)]
pub(crate) struct NewRequestRow<'a> {
    pub request_number: &'a str,
    pub created_on: NaiveDate,
    pub equipment_type: &'a str,
    pub equipment_model: &'a str,
    pub problem_description: &'a str,
    pub customer_name: &'a str,
    pub customer_phone: &'a str,
    pub status: &'a str,
    pub assigned_to: Option<i32>,
    pub assigned_on: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Row struct for reading from the comments table.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: i32,
    pub request_id: i32,
    pub user_id: i32,
    pub body: String,
    pub is_technical_note: bool,
    pub parts_ordered: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CommentRow {
    pub(crate) fn into_comment(self) -> Result<Comment, RowDecodeError> {
        Ok(Comment {
            id: self.id,
            request_id: RequestId::new(self.request_id),
            author_id: UserId::new(self.user_id),
            body: CommentBody::new(&self.body)
                .map_err(|err| RowDecodeError::new("comments", self.id, err))?,
            is_technical_note: self.is_technical_note,
            parts_ordered: self.parts_ordered,
            created_at: self.created_at,
        })
    }
}

/// Insertable struct for new comments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub request_id: i32,
    pub user_id: i32,
    pub body: &'a str,
    pub is_technical_note: bool,
    pub parts_ordered: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Status history
// ---------------------------------------------------------------------------

/// Row struct for reading from the status_history table.
#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = status_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StatusHistoryRow {
    pub id: i32,
    pub request_id: i32,
    pub old_status: Option<String>,
    pub new_status: String,
    pub changed_by: i32,
    pub changed_at: DateTime<Utc>,
}

impl StatusHistoryRow {
    pub(crate) fn into_entry(self) -> Result<StatusHistoryEntry, RowDecodeError> {
        let decode = |code: &str| {
            code.parse::<RequestStatus>()
                .map_err(|err| RowDecodeError::new("status_history", self.id, err))
        };
        let old_status = self.old_status.as_deref().map(decode).transpose()?;
        let new_status = decode(&self.new_status)?;
        Ok(StatusHistoryEntry {
            id: self.id,
            request_id: RequestId::new(self.request_id),
            old_status,
            new_status,
            changed_by: UserId::new(self.changed_by),
            changed_at: self.changed_at,
        })
    }
}

/// Insertable struct for audit entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = status_history)]
pub(crate) struct NewStatusHistoryRow<'a> {
    pub request_id: i32,
    pub old_status: Option<&'a str>,
    pub new_status: &'a str,
    pub changed_by: i32,
    pub changed_at: DateTime<Utc>,
}
