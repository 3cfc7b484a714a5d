//! Authentication service backed by the user repository.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::repository_errors::{map_user_error, retry_read};
use crate::domain::ports::{AuthenticationGateway, UserRepository};
use crate::domain::{
    CurrentActorContext, Error, LoginCredentials, PasswordDigest, PasswordHashError, User, UserId,
};

/// Service implementing [`AuthenticationGateway`].
#[derive(Clone)]
pub struct AuthenticationService<U> {
    users: Arc<U>,
}

impl<U> AuthenticationService<U> {
    /// Create a service over `users`.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> AuthenticationGateway for AuthenticationService<U>
where
    U: UserRepository,
{
    async fn verify_credentials(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Option<User>, Error> {
        let username = credentials.username();
        let stored = retry_read("find_credentials", move || {
            self.users.find_credentials(username)
        })
        .await
        .map_err(map_user_error)?;

        let Some(stored) = stored else {
            info!(username, "login rejected: unknown username");
            return Ok(None);
        };
        if !stored.password_digest.verify(credentials.password()) {
            info!(user_id = %stored.user.id, "login rejected: password mismatch");
            return Ok(None);
        }
        if stored.password_digest.is_legacy() {
            warn!(
                user_id = %stored.user.id,
                "login accepted with unsalted legacy digest; password should be rotated"
            );
        }
        Ok(Some(stored.user))
    }

    fn hash_password(&self, plaintext: &str) -> Result<PasswordDigest, PasswordHashError> {
        PasswordDigest::hash(plaintext)
    }

    async fn resolve_actor(&self, user_id: UserId) -> Result<CurrentActorContext, Error> {
        let user = retry_read("resolve_actor", move || self.users.find_by_id(user_id))
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))?;
        Ok(CurrentActorContext::from(&user))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockUserRepository, StoredCredentials};
    use crate::domain::test_fixtures::sample_user;
    use crate::domain::{ErrorCode, Role};

    fn credentials(username: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(username, password).expect("credentials shape")
    }

    fn users_with(digest: PasswordDigest) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_credentials().returning(move |username| {
            Ok((username == "admin").then(|| StoredCredentials {
                user: sample_user(1, Role::Administrator, "Админ"),
                password_digest: digest.clone(),
            }))
        });
        users
    }

    #[rstest]
    #[case(PasswordDigest::legacy("admin123"), "admin", "admin123", true)]
    #[case(PasswordDigest::hash("admin123").expect("hashable"), "admin", "admin123", true)]
    #[case(PasswordDigest::hash("admin123").expect("hashable"), "admin", "admin124", false)]
    #[case(PasswordDigest::legacy("admin123"), "nobody", "admin123", false)]
    #[tokio::test]
    async fn credentials_verify_against_both_digest_formats(
        #[case] digest: PasswordDigest,
        #[case] username: &str,
        #[case] password: &str,
        #[case] accepted: bool,
    ) {
        let service = AuthenticationService::new(Arc::new(users_with(digest)));

        let result = service
            .verify_credentials(&credentials(username, password))
            .await
            .expect("lookup succeeds");

        assert_eq!(result.is_some(), accepted);
    }

    #[rstest]
    fn gateway_hashes_passwords_with_fresh_salts() {
        let service = AuthenticationService::new(Arc::new(MockUserRepository::new()));

        let first = service.hash_password("pw").expect("hashable");
        let second = service.hash_password("pw").expect("hashable");

        assert_ne!(first, second);
        assert!(first.verify("pw") && second.verify("pw"));
        assert!(!first.is_legacy());
    }

    #[rstest]
    #[tokio::test]
    async fn resolve_actor_builds_context() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_user(id.get(), Role::Technician, "Мастер"))));

        let actor = AuthenticationService::new(Arc::new(users))
            .resolve_actor(UserId::new(4))
            .await
            .expect("actor");

        assert_eq!(actor.role(), Role::Technician);
        assert_eq!(actor.full_name().as_ref(), "Мастер");
    }

    #[rstest]
    #[tokio::test]
    async fn deleted_session_user_is_unauthorized() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let err = AuthenticationService::new(Arc::new(users))
            .resolve_actor(UserId::new(4))
            .await
            .expect_err("gone");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
