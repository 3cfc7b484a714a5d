//! PostgreSQL-backed [`UserRepository`].
//!
//! Deleting a user relies on the schema's foreign keys: comments and history
//! rows cascade, assigned requests have `assigned_to` set to NULL.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoredCredentials, UserRepository, UserRepositoryError};
use crate::domain::{NewUser, Role, User, UserChanges, UserId};

use super::error_mapping::{StorageFailure, USERNAME_UNIQUE};
use super::models::{NewUserRow, UserProfileUpdate, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: impl Into<StorageFailure>) -> UserRepositoryError {
    match failure.into() {
        StorageFailure::Connection(message) => UserRepositoryError::connection(message),
        StorageFailure::Query(message) => UserRepositoryError::query(message),
        StorageFailure::UniqueViolation { constraint } => UserRepositoryError::query(format!(
            "unexpected unique violation on {}",
            constraint.as_deref().unwrap_or("unknown constraint")
        )),
        StorageFailure::ForeignKeyViolation { .. } => {
            UserRepositoryError::query("unexpected foreign key violation")
        }
    }
}

fn decode_all(rows: Vec<UserRow>) -> Result<Vec<User>, UserRepositoryError> {
    rows.into_iter()
        .map(|row| row.into_user().map_err(map_failure))
        .collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let row = NewUserRow {
            username: user.username.as_ref(),
            password_digest: user.password_digest.as_str(),
            role: user.role.as_str(),
            full_name: user.full_name.as_ref(),
            phone: user.phone.as_deref(),
            created_on: user.created_on,
        };

        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                let failure = StorageFailure::from(err);
                if failure.violates_unique(USERNAME_UNIQUE) {
                    UserRepositoryError::duplicate_username(user.username.as_ref())
                } else {
                    map_failure(failure)
                }
            })?;
        inserted.into_user().map_err(map_failure)
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let profile = UserProfileUpdate {
            role: changes.role.as_str(),
            full_name: changes.full_name.as_ref(),
            password_digest: changes.password_digest.as_ref().map(|digest| digest.as_str()),
        };

        let updated: Option<UserRow> = diesel::update(users::table.find(id.get()))
            .set((profile, users::phone.eq(changes.phone.as_deref())))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;
        updated
            .map(|row| row.into_user().map_err(map_failure))
            .transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let removed = diesel::delete(users::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map_err(map_failure)?;
        Ok(removed > 0)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let row: Option<UserRow> = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;
        row.map(|row| row.into_user().map_err(map_failure))
            .transpose()
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, UserRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_failure)?;
        row.map(|row| {
            let (user, password_digest) = row.into_credentials().map_err(map_failure)?;
            Ok(StoredCredentials {
                user,
                password_digest,
            })
        })
        .transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order_by(users::id)
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        decode_all(rows)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserRepositoryError> {
        let mut conn = self.pool.checkout().await.map_err(map_failure)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(role.as_str()))
            .select(UserRow::as_select())
            .order_by((users::full_name, users::id))
            .load(&mut conn)
            .await
            .map_err(map_failure)?;
        decode_all(rows)
    }
}
