//! Seeding helpers for integration tests over the in-memory store.

use chrono::NaiveDate;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{FullName, NewUser, PasswordDigest, Role, User, UserValidationError, Username};
pub use crate::outbound::memory::InMemoryRepairDesk;

fn invalid(error: UserValidationError) -> UserRepositoryError {
    UserRepositoryError::query(error.to_string())
}

/// Insert an account with an Argon2 digest of `password`, created 2024-01-01.
pub async fn seed_user(
    store: &InMemoryRepairDesk,
    username: &str,
    password: &str,
    role: Role,
    full_name: &str,
) -> Result<User, UserRepositoryError> {
    store
        .create(&NewUser {
            username: Username::new(username).map_err(invalid)?,
            password_digest: PasswordDigest::hash(password)
                .map_err(|err| invalid(UserValidationError::UnhashablePassword(err)))?,
            role,
            full_name: FullName::new(full_name).map_err(invalid)?,
            phone: None,
            created_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        })
        .await
}
