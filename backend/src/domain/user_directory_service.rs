//! User administration service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use super::repository_errors::{map_user_error, retry_read};
use crate::domain::ports::{AuthenticationGateway, UserDirectory, UserRepository};
use crate::domain::{
    CurrentActorContext, Error, NewUser, Operation, Role, User, UserChanges, UserDraft, UserId,
    UserProfileDraft, UserValidationError, sort_for_directory,
};

/// Directory service implementing [`UserDirectory`].
#[derive(Clone)]
pub struct UserDirectoryService<U> {
    users: Arc<U>,
    auth: Arc<dyn AuthenticationGateway>,
    clock: Arc<dyn Clock>,
}

impl<U> UserDirectoryService<U> {
    /// Create a service over `users`.
    ///
    /// Passwords are digested through `auth`; `clock` dates new accounts.
    pub fn new(users: Arc<U>, auth: Arc<dyn AuthenticationGateway>, clock: Arc<dyn Clock>) -> Self {
        Self { users, auth, clock }
    }
}

fn invalid_user(error: &UserValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

#[async_trait]
impl<U> UserDirectory for UserDirectoryService<U>
where
    U: UserRepository,
{
    async fn create_user(
        &self,
        actor: &CurrentActorContext,
        draft: UserDraft,
    ) -> Result<User, Error> {
        actor.require(Operation::CreateUser)?;
        let new_user = NewUser::from_draft(&draft, self.clock.utc().date_naive(), |password| {
            self.auth.hash_password(password)
        })
            .map_err(|err| invalid_user(&err))?;
        let user = self
            .users
            .create(&new_user)
            .await
            .map_err(map_user_error)?;
        info!(user_id = %user.id, role = %user.role, by = %actor.user_id(), "user created");
        Ok(user)
    }

    async fn update_user(
        &self,
        actor: &CurrentActorContext,
        id: UserId,
        draft: UserProfileDraft,
    ) -> Result<User, Error> {
        actor.require(Operation::EditUser)?;
        let changes = UserChanges::from_draft(&draft, |password| self.auth.hash_password(password))
            .map_err(|err| invalid_user(&err))?;
        let user = self
            .users
            .update(id, &changes)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))?;
        info!(
            user_id = %id,
            password_changed = changes.password_digest.is_some(),
            by = %actor.user_id(),
            "user updated"
        );
        Ok(user)
    }

    async fn delete_user(&self, actor: &CurrentActorContext, id: UserId) -> Result<(), Error> {
        actor.require(Operation::DeleteUser)?;
        if id == actor.user_id() {
            return Err(Error::invalid_request("cannot delete your own account"));
        }
        let removed = self.users.delete(id).await.map_err(map_user_error)?;
        if !removed {
            return Err(Error::not_found(format!("user {id} not found")));
        }
        info!(user_id = %id, by = %actor.user_id(), "user deleted");
        Ok(())
    }

    async fn list_users(&self, actor: &CurrentActorContext) -> Result<Vec<User>, Error> {
        actor.require(Operation::ViewUsers)?;
        let mut users = retry_read("list_users", move || self.users.list())
            .await
            .map_err(map_user_error)?;
        sort_for_directory(&mut users);
        Ok(users)
    }

    async fn list_technicians(&self, actor: &CurrentActorContext) -> Result<Vec<User>, Error> {
        actor.require(Operation::ViewTechnicians)?;
        retry_read("list_technicians", move || {
            self.users.list_by_role(Role::Technician)
        })
        .await
        .map_err(map_user_error)
    }
}

#[cfg(test)]
#[path = "user_directory_service_tests.rs"]
mod tests;
