//! Driving ports for account registration, login and profile management.
//!
//! Inbound adapters depend on these traits only, so handler tests can swap in
//! mocks instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, NewAccount, ProfileUpdate, User, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    ///
    /// Unknown emails, wrong passwords and inactive accounts all yield the
    /// same `unauthorized` error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;

    /// Confirm a session identity still names an active account.
    ///
    /// Deleted and deactivated accounts yield `unauthorized`.
    async fn require_active(&self, user_id: &UserId) -> Result<(), Error>;
}

/// Domain use-case port for managing accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccounts: Send + Sync {
    /// Register a regular account; duplicate emails are a `conflict`.
    async fn register(&self, account: NewAccount) -> Result<User, Error>;

    /// Fetch the acting user's own profile.
    async fn profile(&self, user_id: &UserId) -> Result<User, Error>;

    /// Apply a partial update to the acting user's profile.
    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate)
    -> Result<User, Error>;
}
