//! Driving port for authentication.
//!
//! Inbound adapters verify credentials and resolve the session's user id into
//! a [`CurrentActorContext`] through this port, without importing the
//! persistence layer.

use async_trait::async_trait;

use crate::domain::{
    CurrentActorContext, Error, LoginCredentials, PasswordDigest, PasswordHashError, User, UserId,
};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthenticationGateway: Send + Sync {
    /// The user owning these credentials, or `None` when they do not match.
    async fn verify_credentials(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<User>, Error>;

    /// Digest a new password for storage.
    ///
    /// # Errors
    ///
    /// [`PasswordHashError`] when the password cannot be hashed.
    fn hash_password(&self, plaintext: &str) -> Result<PasswordDigest, PasswordHashError>;

    /// Build the actor context for an authenticated user id.
    ///
    /// # Errors
    ///
    /// `unauthorized` when the user no longer exists.
    async fn resolve_actor(&self, user_id: UserId) -> Result<CurrentActorContext, Error>;
}
