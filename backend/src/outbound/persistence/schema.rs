//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate with `diesel print-schema` or
//! edit by hand.

diesel::table! {
    /// Staff and customer accounts.
    users (id) {
        id -> Int4,
        /// Unique login name.
        username -> Varchar,
        /// Argon2id PHC string, or a bare hex SHA-256 digest for legacy rows.
        password_digest -> Text,
        /// snake_case role code, CHECK-constrained.
        role -> Text,
        full_name -> Text,
        phone -> Nullable<Text>,
        created_on -> Date,
    }
}

diesel::table! {
    /// Repair requests.
    requests (id) {
        id -> Int4,
        /// `REQ-<year>-<sequence>`, unique.
        request_number -> Varchar,
        created_on -> Date,
        equipment_type -> Text,
        equipment_model -> Text,
        problem_description -> Text,
        customer_name -> Text,
        customer_phone -> Text,
        /// snake_case status code, CHECK-constrained.
        status -> Text,
        /// Cleared when the user is deleted.
        assigned_to -> Nullable<Int4>,
        assigned_on -> Nullable<Date>,
        completed_on -> Nullable<Date>,
    }
}

diesel::table! {
    /// Append-only comment thread per request.
    comments (id) {
        id -> Int4,
        request_id -> Int4,
        user_id -> Int4,
        body -> Text,
        is_technical_note -> Bool,
        parts_ordered -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail of status changes.
    status_history (id) {
        id -> Int4,
        request_id -> Int4,
        old_status -> Nullable<Text>,
        new_status -> Text,
        changed_by -> Int4,
        changed_at -> Timestamptz,
    }
}

diesel::joinable!(requests -> users (assigned_to));
diesel::joinable!(comments -> requests (request_id));
diesel::joinable!(comments -> users (user_id));
diesel::joinable!(status_history -> requests (request_id));
diesel::joinable!(status_history -> users (changed_by));

diesel::allow_tables_to_appear_in_same_query!(users, requests, comments, status_history);
