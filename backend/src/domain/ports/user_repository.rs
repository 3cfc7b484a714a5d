//! Port for user account persistence.

use async_trait::async_trait;

use crate::domain::{NewUser, PasswordDigest, Role, User, UserChanges, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses the username.
        DuplicateUsername { username: String } => "username already exists: {username}",
    }
}

/// Account row as needed for credential verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    pub password_digest: PasswordDigest,
}

/// Port for reading and administering user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account, failing on a duplicate username.
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError>;

    /// Apply profile changes; `None` when the user does not exist.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Delete an account, cascading to its comments and history entries and
    /// clearing it from assigned requests. Returns whether a row was removed.
    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError>;

    /// Look a user up by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Load the account and digest for a username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError>;

    /// Every account, in no particular order.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Accounts holding `role`, ordered by full name.
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError>;
}
