//! Request and response bodies for the recipe endpoints.
//!
//! Requests accept `timeMinutes` or `time_minutes`; responses are camelCase.
//! Nested `tags` carry a `label` (or `name`) and nested `ingredients` a
//! `name`; ids in nested entries are ignored because entries are matched by
//! name.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AttributeKind, AttributeName, AttributeSpec, CookingTime, Error, Price, Recipe,
    RecipeAttribute, RecipeChanges, RecipeDraft, RecipeFields, RecipeId, RecipeLink,
    RecipeValidationError, Title,
};
use crate::inbound::http::validation::{
    attribute_validation_error, missing_field_error, recipe_validation_error,
};

/// Price as sent by clients: `"5.50"` or `5.5`.
///
/// Strings must be plain decimal literals. Numbers are judged by their value,
/// so `2.5e1` is `25.00` and `1e-7` has too many decimal places.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Text(String),
    Number(serde_json::Number),
}

impl PriceInput {
    fn parse(&self) -> Result<Price, Error> {
        let parsed = match self {
            Self::Text(text) => text.parse::<Price>(),
            Self::Number(number) => decimal_literal(number).parse::<Price>(),
        };
        parsed.map_err(|err| recipe_validation_error(RecipeValidationError::from(err)))
    }
}

/// Spell a JSON number positionally. `Number`'s own `Display` switches to
/// exponent form for very small or large floats; `f64`'s never does.
fn decimal_literal(number: &serde_json::Number) -> String {
    if let Some(value) = number.as_u64() {
        return value.to_string();
    }
    if let Some(value) = number.as_i64() {
        return value.to_string();
    }
    number
        .as_f64()
        .map_or_else(|| number.to_string(), |value| value.to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagPayload {
    #[serde(alias = "name")]
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientPayload {
    pub name: String,
}

/// Body of `POST`, `PUT` and `PATCH /recipes`.
///
/// Every field is optional at the serde level so missing required fields
/// surface as field-scoped validation errors. A `null` collection is
/// treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "time_minutes")]
    pub time_minutes: Option<i64>,
    pub price: Option<PriceInput>,
    pub link: Option<String>,
    pub tags: Option<Vec<TagPayload>>,
    pub ingredients: Option<Vec<IngredientPayload>>,
}

/// Which fields an update must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// `PUT`: title, cooking time and price are required.
    Replace,
    /// `PATCH`: everything is optional.
    Partial,
}

fn specs<'a>(
    kind: AttributeKind,
    names: impl Iterator<Item = &'a str>,
) -> Result<Vec<AttributeSpec>, Error> {
    names
        .enumerate()
        .map(|(index, name)| {
            AttributeName::new(name)
                .map(AttributeSpec::new)
                .map_err(|err| attribute_validation_error(kind, Some(index), err))
        })
        .collect()
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

impl RecipePayload {
    fn title(&self) -> Result<Option<Title>, Error> {
        self.title
            .clone()
            .map(Title::new)
            .transpose()
            .map_err(recipe_validation_error)
    }

    fn time_minutes(&self) -> Result<Option<CookingTime>, Error> {
        self.time_minutes
            .map(CookingTime::new)
            .transpose()
            .map_err(recipe_validation_error)
    }

    fn price(&self) -> Result<Option<Price>, Error> {
        self.price.as_ref().map(PriceInput::parse).transpose()
    }

    fn link(&self) -> Result<Option<RecipeLink>, Error> {
        self.link
            .clone()
            .map(RecipeLink::new)
            .transpose()
            .map_err(recipe_validation_error)
    }

    fn tag_specs(&self) -> Result<Option<Vec<AttributeSpec>>, Error> {
        self.tags
            .as_ref()
            .map(|tags| specs(AttributeKind::Tag, tags.iter().map(|tag| tag.label.as_str())))
            .transpose()
    }

    fn ingredient_specs(&self) -> Result<Option<Vec<AttributeSpec>>, Error> {
        self.ingredients
            .as_ref()
            .map(|items| {
                specs(
                    AttributeKind::Ingredient,
                    items.iter().map(|item| item.name.as_str()),
                )
            })
            .transpose()
    }

    /// Validate a creation payload.
    pub fn into_draft(self) -> Result<RecipeDraft, Error> {
        let fields = RecipeFields {
            title: require(self.title()?, "title")?,
            description: self.description.clone().unwrap_or_default(),
            time_minutes: require(self.time_minutes()?, "timeMinutes")?,
            price: require(self.price()?, "price")?,
            link: self.link()?.unwrap_or_default(),
        };
        Ok(RecipeDraft {
            fields,
            tags: self.tag_specs()?.unwrap_or_default(),
            ingredients: self.ingredient_specs()?.unwrap_or_default(),
        })
    }

    /// Validate an update payload.
    pub fn into_changes(self, mode: UpdateMode) -> Result<RecipeChanges, Error> {
        let changes = RecipeChanges {
            title: self.title()?,
            description: self.description.clone(),
            time_minutes: self.time_minutes()?,
            price: self.price()?,
            link: self.link()?,
            tags: self.tag_specs()?,
            ingredients: self.ingredient_specs()?,
        };
        if mode == UpdateMode::Replace {
            require(changes.title.as_ref(), "title")?;
            require(changes.time_minutes, "timeMinutes")?;
            require(changes.price, "price")?;
        }
        Ok(changes)
    }
}

/// Query string of `GET /recipes`, e.g. `?tags=1,2&ingredients=3`.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub tags: Option<String>,
    pub ingredients: Option<String>,
}

/// Query string of `POST /recipes/{id}/upload-image`.
#[derive(Debug, Default, Deserialize)]
pub struct ImageQuery {
    pub filename: Option<String>,
}

/// A tag (`{id, label}`) or ingredient (`{id, name}`) as rendered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeBody {
    Tag { id: i64, label: String },
    Ingredient { id: i64, name: String },
}

impl From<&RecipeAttribute> for AttributeBody {
    fn from(attribute: &RecipeAttribute) -> Self {
        let id = attribute.id().get();
        let name = attribute.name().to_string();
        match attribute.kind() {
            AttributeKind::Tag => Self::Tag { id, label: name },
            AttributeKind::Ingredient => Self::Ingredient { id, name },
        }
    }
}

fn bodies(attributes: &[RecipeAttribute]) -> Vec<AttributeBody> {
    attributes.iter().map(AttributeBody::from).collect()
}

/// List projection of a recipe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: String,
    pub time_minutes: i32,
    pub price: Price,
    pub link: String,
    pub tags: Vec<AttributeBody>,
    pub ingredients: Vec<AttributeBody>,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id(),
            title: recipe.title().as_ref().to_owned(),
            time_minutes: recipe.time_minutes().minutes(),
            price: recipe.price(),
            link: recipe.link().as_ref().to_owned(),
            tags: bodies(recipe.tags()),
            ingredients: bodies(recipe.ingredients()),
        }
    }
}

/// Detail projection: the summary plus description and image path.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub summary: RecipeSummary,
    pub description: String,
    pub image: Option<String>,
}

impl From<&Recipe> for RecipeDetail {
    fn from(recipe: &Recipe) -> Self {
        Self {
            summary: RecipeSummary::from(recipe),
            description: recipe.description().to_owned(),
            image: recipe.image().map(str::to_owned),
        }
    }
}

/// Response of an image upload.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeImageBody {
    pub id: RecipeId,
    pub image: Option<String>,
}

impl From<&Recipe> for RecipeImageBody {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id(),
            image: recipe.image().map(str::to_owned),
        }
    }
}
