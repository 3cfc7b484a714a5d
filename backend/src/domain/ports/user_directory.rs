//! Driving port for user administration.

use async_trait::async_trait;

use crate::domain::{CurrentActorContext, Error, User, UserDraft, UserId, UserProfileDraft};

/// Domain use-case port for managing accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Create an account; `conflict` when the username is taken.
    async fn create_user(
        &self,
        actor: &CurrentActorContext,
        draft: UserDraft,
    ) -> Result<User, Error>;

    /// Edit role, name, phone, and optionally the password.
    async fn update_user(
        &self,
        actor: &CurrentActorContext,
        id: UserId,
        draft: UserProfileDraft,
    ) -> Result<User, Error>;

    /// Delete an account other than the actor's own.
    async fn delete_user(&self, actor: &CurrentActorContext, id: UserId) -> Result<(), Error>;

    /// All accounts in directory order.
    async fn list_users(&self, actor: &CurrentActorContext) -> Result<Vec<User>, Error>;

    /// Technicians by full name.
    async fn list_technicians(&self, actor: &CurrentActorContext) -> Result<Vec<User>, Error>;
}
