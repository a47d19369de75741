//! User accounts and the value types guarding their fields.
//!
//! Inbound adapters build these types from raw strings so that services only
//! ever see validated data.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Maximum length of an email address, in characters.
pub const EMAIL_MAX: usize = 255;
/// Maximum length of a user's display name, in characters.
pub const USER_NAME_MAX: usize = 255;
/// Minimum length of a password, in characters.
pub const PASSWORD_MIN: usize = 5;

/// Validation failures raised by the user value types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must not be empty")]
    EmptyId,
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must contain a single '@' between a local part and a domain")]
    MalformedEmail,
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

impl UserValidationError {
    /// Name of the payload field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyEmail | Self::MalformedEmail | Self::EmailTooLong { .. } => "email",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::EmptyPassword | Self::PasswordTooShort { .. } => "password",
        }
    }

    /// Stable machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::EmptyEmail | Self::EmptyName | Self::EmptyPassword => "empty",
            Self::InvalidId | Self::MalformedEmail => "malformed",
            Self::EmailTooLong { .. } | Self::NameTooLong { .. } => "too_long",
            Self::PasswordTooShort { .. } => "too_short",
        }
    }
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse a [`UserId`] from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalised email address used as the login identifier.
///
/// The domain part is lower-cased; the local part is kept as supplied since
/// mail servers may treat it case-sensitively.
///
/// # Examples
/// ```
/// use recipe_backend::domain::EmailAddress;
///
/// let email = EmailAddress::new("Chef@EXAMPLE.com").unwrap();
/// assert_eq!(email.as_ref(), "Chef@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Trim and validate an address, lowercasing its domain part.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let (local, domain) = trimmed
            .split_once('@')
            .ok_or(UserValidationError::MalformedEmail)?;
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(format!("{local}@{}", domain.to_lowercase())))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Human readable name shown for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    /// Reject blank names and names over [`USER_NAME_MAX`] characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if value.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong {
                max: USER_NAME_MAX,
            });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plain-text password accepted at registration or profile update.
///
/// The buffer is zeroed on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept a plaintext password of at least [`PASSWORD_MIN`] characters.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = Zeroizing::new(raw.into());
        if value.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        if value.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(Self(value))
    }

    /// Expose the secret for hashing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Opaque password digest produced by a [`crate::domain::ports::PasswordHasher`].
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded digest as stored in the `users` table.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

/// Account permission flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFlags {
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl UserFlags {
    /// Flags for an ordinary self-registered account.
    pub const REGULAR: Self = Self {
        is_active: true,
        is_staff: false,
        is_superuser: false,
    };

    /// Flags for an operator account created through the superuser factory.
    pub const SUPERUSER: Self = Self {
        is_active: true,
        is_staff: true,
        is_superuser: true,
    };
}

impl Default for UserFlags {
    fn default() -> Self {
        Self::REGULAR
    }
}

/// Application user.
///
/// ## Invariants
/// - `email` is unique across all users (enforced by the repository).
/// - The password digest never travels with this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    name: DisplayName,
    flags: UserFlags,
}

impl User {
    /// Build a regular, active user.
    pub fn new(id: UserId, email: EmailAddress, name: DisplayName) -> Self {
        Self::with_flags(id, email, name, UserFlags::REGULAR)
    }

    /// Build a staff superuser.
    pub fn superuser(id: UserId, email: EmailAddress, name: DisplayName) -> Self {
        Self::with_flags(id, email, name, UserFlags::SUPERUSER)
    }

    pub fn with_flags(id: UserId, email: EmailAddress, name: DisplayName, flags: UserFlags) -> Self {
        Self {
            id,
            email,
            name,
            flags,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn flags(&self) -> UserFlags {
        self.flags
    }

    pub fn is_active(&self) -> bool {
        self.flags.is_active
    }

    /// Replace the display name.
    pub fn rename(&mut self, name: DisplayName) {
        self.name = name;
    }
}

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: EmailAddress,
    pub name: DisplayName,
    pub password: Password,
}

impl NewAccount {
    /// Validate raw registration inputs.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::NewAccount;
    ///
    /// let account = NewAccount::try_from_parts("cook@example.com", "Cook", "secret").unwrap();
    /// assert_eq!(account.email.as_ref(), "cook@example.com");
    /// assert!(NewAccount::try_from_parts("", "Cook", "secret").is_err());
    /// ```
    pub fn try_from_parts(
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            email: EmailAddress::new(email)?,
            name: DisplayName::new(name)?,
            password: Password::new(password)?,
        })
    }
}

/// Credentials presented at login.
///
/// The password is only checked for presence; length rules belong to
/// registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, UserValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Partial update to the authenticated user's profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<DisplayName>,
    pub password: Option<Password>,
}
