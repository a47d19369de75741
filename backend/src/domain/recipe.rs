//! Recipes and the payload types used to create or change them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AttributeId, AttributeSpec, RecipeAttribute, UserId};

mod price;

pub use price::{PRICE_DECIMAL_PLACES, PRICE_MAX_DIGITS, Price, PriceError};

/// Maximum length of a recipe title, in characters.
pub const TITLE_MAX: usize = 255;
/// Maximum length of a recipe link, in characters.
pub const LINK_MAX: usize = 255;

/// Validation failures for recipe scalar fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeValidationError {
    #[error("title must not be blank")]
    BlankTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("cooking time must be a positive number of minutes")]
    NonPositiveTime,
    #[error("link must be at most {max} characters")]
    LinkTooLong { max: usize },
    #[error(transparent)]
    Price(#[from] PriceError),
}

impl RecipeValidationError {
    /// Name of the payload field the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::BlankTitle | Self::TitleTooLong { .. } => "title",
            Self::NonPositiveTime => "timeMinutes",
            Self::LinkTooLong { .. } => "link",
            Self::Price(_) => "price",
        }
    }

    /// Stable code reported next to [`Self::field`].
    pub fn code(&self) -> &'static str {
        match self {
            Self::BlankTitle => "blank",
            Self::TitleTooLong { .. } | Self::LinkTooLong { .. } => "too_long",
            Self::NonPositiveTime => "not_positive",
            Self::Price(err) => err.code(),
        }
    }
}

/// Database identifier of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(i64);

impl RecipeId {
    /// Wrap a primary key read from storage or a request path.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recipe title: not blank and at most [`TITLE_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Validate a title. Surrounding whitespace is kept as sent.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::Title;
    ///
    /// assert!(Title::new("Tomato soup").is_ok());
    /// assert!(Title::new("  ").is_err());
    /// ```
    pub fn new(raw: impl Into<String>) -> Result<Self, RecipeValidationError> {
        let value = raw.into();
        if value.trim().is_empty() {
            return Err(RecipeValidationError::BlankTitle);
        }
        if value.chars().count() > TITLE_MAX {
            return Err(RecipeValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Preparation time in whole minutes; always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CookingTime(i32);

impl CookingTime {
    /// Rejects zero, negatives and values beyond `i32`.
    pub fn new(minutes: i64) -> Result<Self, RecipeValidationError> {
        i32::try_from(minutes)
            .ok()
            .filter(|value| *value > 0)
            .map(Self)
            .ok_or(RecipeValidationError::NonPositiveTime)
    }

    pub fn minutes(self) -> i32 {
        self.0
    }
}

/// Optional external reference to the recipe; the empty string means none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecipeLink(String);

impl RecipeLink {
    /// At most [`LINK_MAX`] characters; the content is not checked as a URL.
    pub fn new(raw: impl Into<String>) -> Result<Self, RecipeValidationError> {
        let value = raw.into();
        if value.chars().count() > LINK_MAX {
            return Err(RecipeValidationError::LinkTooLong { max: LINK_MAX });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for RecipeLink {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Scalar columns of a recipe, written in a single statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub title: Title,
    pub description: String,
    pub time_minutes: CookingTime,
    pub price: Price,
    pub link: RecipeLink,
}

/// A recipe with its tags and ingredients resolved.
///
/// ## Invariants
/// - Every attribute in `tags` and `ingredients` shares `owner`.
/// - `tags` and `ingredients` are ordered by attribute id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    id: RecipeId,
    owner: UserId,
    fields: RecipeFields,
    image: Option<String>,
    tags: Vec<RecipeAttribute>,
    ingredients: Vec<RecipeAttribute>,
}

/// Parts used to assemble a [`Recipe`] from storage.
#[derive(Debug, Clone)]
pub struct RecipeParts {
    pub id: RecipeId,
    pub owner: UserId,
    pub fields: RecipeFields,
    pub image: Option<String>,
    pub tags: Vec<RecipeAttribute>,
    pub ingredients: Vec<RecipeAttribute>,
}

impl From<RecipeParts> for Recipe {
    fn from(parts: RecipeParts) -> Self {
        let RecipeParts {
            id,
            owner,
            fields,
            image,
            mut tags,
            mut ingredients,
        } = parts;
        tags.sort_by_key(RecipeAttribute::id);
        ingredients.sort_by_key(RecipeAttribute::id);
        Self {
            id,
            owner,
            fields,
            image,
            tags,
            ingredients,
        }
    }
}

impl Recipe {
    pub fn id(&self) -> RecipeId {
        self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn fields(&self) -> &RecipeFields {
        &self.fields
    }

    pub fn title(&self) -> &Title {
        &self.fields.title
    }

    pub fn description(&self) -> &str {
        self.fields.description.as_str()
    }

    pub fn time_minutes(&self) -> CookingTime {
        self.fields.time_minutes
    }

    pub fn price(&self) -> Price {
        self.fields.price
    }

    pub fn link(&self) -> &RecipeLink {
        &self.fields.link
    }

    /// Relative storage path of the uploaded image, if any.
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn tags(&self) -> &[RecipeAttribute] {
        &self.tags
    }

    pub fn ingredients(&self) -> &[RecipeAttribute] {
        &self.ingredients
    }
}

/// Payload for creating a recipe.
///
/// Missing collections arrive as empty vectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub fields: RecipeFields,
    pub tags: Vec<AttributeSpec>,
    pub ingredients: Vec<AttributeSpec>,
}

/// Partial update to a recipe.
///
/// For the collections, `Some(vec![])` clears the links while `None` leaves
/// them untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    pub title: Option<Title>,
    pub description: Option<String>,
    pub time_minutes: Option<CookingTime>,
    pub price: Option<Price>,
    pub link: Option<RecipeLink>,
    pub tags: Option<Vec<AttributeSpec>>,
    pub ingredients: Option<Vec<AttributeSpec>>,
}

impl RecipeChanges {
    /// Apply the scalar changes onto `fields`.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::{CookingTime, Price, RecipeChanges, RecipeFields, RecipeLink, Title};
    ///
    /// let mut fields = RecipeFields {
    ///     title: Title::new("Soup").unwrap(),
    ///     description: String::new(),
    ///     time_minutes: CookingTime::new(10).unwrap(),
    ///     price: "5.00".parse::<Price>().unwrap(),
    ///     link: RecipeLink::default(),
    /// };
    /// let changes = RecipeChanges {
    ///     title: Some(Title::new("Stew").unwrap()),
    ///     ..RecipeChanges::default()
    /// };
    /// changes.apply_scalars(&mut fields);
    /// assert_eq!(fields.title.as_ref(), "Stew");
    /// assert_eq!(fields.time_minutes.minutes(), 10);
    /// ```
    pub fn apply_scalars(&self, fields: &mut RecipeFields) {
        if let Some(title) = &self.title {
            fields.title = title.clone();
        }
        if let Some(description) = &self.description {
            fields.description = description.clone();
        }
        if let Some(time) = self.time_minutes {
            fields.time_minutes = time;
        }
        if let Some(price) = self.price {
            fields.price = price;
        }
        if let Some(link) = &self.link {
            fields.link = link.clone();
        }
    }
}

/// Optional related-entity filters for listing recipes.
///
/// Ids within one list are alternatives; both lists must match when both are
/// non-empty. An empty list applies no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: Vec<AttributeId>,
    pub ingredients: Vec<AttributeId>,
}

impl RecipeFilter {
    /// Whether `recipe` satisfies this filter.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let any_of = |wanted: &[AttributeId], linked: &[RecipeAttribute]| {
            wanted.is_empty() || linked.iter().any(|attr| wanted.contains(&attr.id()))
        };
        any_of(&self.tags, recipe.tags()) && any_of(&self.ingredients, recipe.ingredients())
    }
}
