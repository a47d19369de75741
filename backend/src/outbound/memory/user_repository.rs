//! In-memory [`UserRepository`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{StoredUser, UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, PasswordHash, User, UserId};

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<UserId, StoredUser>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        if users.values().any(|stored| stored.user.email() == user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        users.insert(
            *user.id(),
            StoredUser {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|stored| stored.user.email() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let users = self.users.read().await;
        Ok(users.get(id).map(|stored| stored.user.clone()))
    }

    async fn update(
        &self,
        user: &User,
        password_hash: Option<PasswordHash>,
    ) -> Result<(), UserPersistenceError> {
        let mut users = self.users.write().await;
        let stored = users
            .get_mut(user.id())
            .ok_or_else(|| UserPersistenceError::query(format!("user {} not found", user.id())))?;
        stored.user = user.clone();
        if let Some(hash) = password_hash {
            stored.password_hash = hash;
        }
        Ok(())
    }
}
