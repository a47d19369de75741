//! PostgreSQL-backed [`UserRepository`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoredUser, UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, PasswordHash, User, UserId};

use super::diesel_helpers::{DieselFailure, is_unique_violation};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_row(
        &self,
        filter: users::BoxedQuery<'_, diesel::pg::Pg>,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(UserPersistenceError::from_pool)?;
        let row: Option<UserRow> = filter
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(UserPersistenceError::from_diesel)?;
        row.map(|row| {
            row.into_domain()
                .map(|(user, password_hash)| StoredUser {
                    user,
                    password_hash,
                })
                .map_err(UserPersistenceError::query)
        })
        .transpose()
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(UserPersistenceError::from_pool)?;
        diesel::insert_into(users::table)
            .values(NewUserRow::new(user, password_hash))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_email(user.email().as_ref())
                } else {
                    UserPersistenceError::from_diesel(err)
                }
            })?;
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        self.find_row(
            users::table
                .filter(users::email.eq(email.as_ref().to_owned()))
                .into_boxed(),
        )
        .await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let stored = self
            .find_row(users::table.filter(users::id.eq(*id.as_uuid())).into_boxed())
            .await?;
        Ok(stored.map(|stored| stored.user))
    }

    async fn update(
        &self,
        user: &User,
        password_hash: Option<PasswordHash>,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(UserPersistenceError::from_pool)?;
        let changes = UserChangeset {
            name: user.name().as_ref(),
            password_hash: password_hash.as_ref().map(PasswordHash::as_str),
        };
        let updated = diesel::update(users::table.filter(users::id.eq(*user.id().as_uuid())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(UserPersistenceError::from_diesel)?;
        if updated == 0 {
            return Err(UserPersistenceError::query(format!(
                "user {} does not exist",
                user.id()
            )));
        }
        Ok(())
    }
}
