//! Recipe attributes: the tags and ingredients a user attaches to recipes.
//!
//! Both kinds share one shape (an owner and a free-text name) and one set of
//! operations, so they are modelled as a single entity discriminated by
//! [`AttributeKind`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::UserId;

/// Maximum length of a tag label or ingredient name, in characters.
pub const ATTRIBUTE_NAME_MAX: usize = 255;

/// Discriminates tags from ingredients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Tag,
    Ingredient,
}

impl AttributeKind {
    /// Singular noun used in messages, e.g. `"tag not found"`.
    pub fn noun(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Ingredient => "ingredient",
        }
    }

    /// JSON field carrying the name for this kind.
    pub fn name_field(self) -> &'static str {
        match self {
            Self::Tag => "label",
            Self::Ingredient => "name",
        }
    }

    /// Payload key holding a recipe's collection of this kind.
    pub fn collection_field(self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Ingredient => "ingredients",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Database identifier of a tag or ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(i64);

impl AttributeId {
    /// Wrap a primary key read from storage or a request path.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for attribute names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeValidationError {
    #[error("name must not be blank")]
    Blank,
    #[error("name must be at most {max} characters")]
    TooLong { max: usize },
}

impl AttributeValidationError {
    /// Stable machine-readable failure code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::TooLong { .. } => "too_long",
        }
    }
}

/// Non-blank tag label or ingredient name.
///
/// Names are compared exactly: `"Vegan"` and `"vegan"` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeName(String);

impl AttributeName {
    /// # Examples
    /// ```
    /// use recipe_backend::domain::AttributeName;
    ///
    /// assert!(AttributeName::new("Vegan").is_ok());
    /// assert!(AttributeName::new("   ").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, AttributeValidationError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(AttributeValidationError::Blank);
        }
        if value.chars().count() > ATTRIBUTE_NAME_MAX {
            return Err(AttributeValidationError::TooLong {
                max: ATTRIBUTE_NAME_MAX,
            });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for AttributeName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AttributeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted tag or ingredient.
///
/// ## Invariants
/// - `owner` is fixed at creation and never reassigned.
/// - `(owner, kind, name)` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeAttribute {
    id: AttributeId,
    owner: UserId,
    kind: AttributeKind,
    name: AttributeName,
}

impl RecipeAttribute {
    pub fn new(id: AttributeId, owner: UserId, kind: AttributeKind, name: AttributeName) -> Self {
        Self {
            id,
            owner,
            kind,
            name,
        }
    }

    pub fn id(&self) -> AttributeId {
        self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn name(&self) -> &AttributeName {
        &self.name
    }
}

/// Loosely specified attribute supplied inside a recipe payload.
///
/// The resolver turns each spec into an existing or freshly created
/// [`RecipeAttribute`] owned by the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSpec {
    pub name: AttributeName,
}

impl AttributeSpec {
    pub fn new(name: AttributeName) -> Self {
        Self { name }
    }
}
