//! Account use-cases: registration, login and profile management.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    LoginService, PasswordHasher, StoredUser, UserAccounts, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    Error, LoginCredentials, NewAccount, Password, PasswordHash, ProfileUpdate, User, UserFlags,
    UserId,
};
use zeroize::Zeroizing;

/// User service implementing the account driving ports.
#[derive(Clone)]
pub struct UserService<R, H> {
    users: Arc<R>,
    hasher: Arc<H>,
}

impl<R, H> UserService<R, H> {
    /// Build the service over a user repository and a password hasher.
    pub fn new(users: Arc<R>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

impl<R, H> UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher + 'static,
{
    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { email } => {
                Error::conflict(format!("email {email} is already registered"))
                    .with_details(json!({ "field": "email", "code": "duplicate" }))
            }
        }
    }

    async fn create(&self, account: NewAccount, flags: UserFlags) -> Result<User, Error> {
        let NewAccount {
            email,
            name,
            password,
        } = account;
        let user = User::with_flags(UserId::random(), email, name, flags);
        let hash = self.hash_password(password).await?;
        self.users
            .insert(&user, &hash)
            .await
            .map_err(Self::map_persistence_error)?;
        info!(user_id = %user.id(), staff = flags.is_staff, "account created");
        Ok(user)
    }

    /// Create a staff superuser account.
    pub async fn create_superuser(&self, account: NewAccount) -> Result<User, Error> {
        self.create(account, UserFlags::SUPERUSER).await
    }

    /// Run the iterated digest on the blocking pool.
    async fn hash_password(&self, password: Password) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))
    }

    async fn verify_password(&self, candidate: &str, hash: PasswordHash) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let candidate = Zeroizing::new(candidate.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify(&candidate, &hash))
            .await
            .map_err(|err| Error::internal(format!("password check task failed: {err}")))
    }

    async fn load(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

#[async_trait]
impl<R, H> LoginService for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(Self::map_persistence_error)?;
        let Some(stored) = stored else {
            return Err(Error::unauthorized("invalid credentials"));
        };
        let StoredUser {
            user,
            password_hash,
        } = stored;
        if user.is_active()
            && self
                .verify_password(credentials.password(), password_hash)
                .await?
        {
            return Ok(*user.id());
        }
        warn!(user_id = %user.id(), "rejected login attempt");
        Err(Error::unauthorized("invalid credentials"))
    }

    async fn require_active(&self, user_id: &UserId) -> Result<(), Error> {
        let user = self.load(user_id).await?;
        if user.is_active() {
            Ok(())
        } else {
            warn!(%user_id, "session for inactive account rejected");
            Err(Error::unauthorized("login required"))
        }
    }
}

#[async_trait]
impl<R, H> UserAccounts for UserService<R, H>
where
    R: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn register(&self, account: NewAccount) -> Result<User, Error> {
        self.create(account, UserFlags::REGULAR).await
    }

    async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.load(user_id).await
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let mut user = self.load(user_id).await?;
        let ProfileUpdate { name, password } = update;
        if let Some(name) = name {
            user.rename(name);
        }
        let hash = match password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };
        self.users
            .update(&user, hash)
            .await
            .map_err(Self::map_persistence_error)?;
        Ok(user)
    }
}
