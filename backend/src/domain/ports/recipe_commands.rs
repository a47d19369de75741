//! Driving ports for recipe and attribute use-cases.

use async_trait::async_trait;

use crate::domain::{
    AttributeId, AttributeKind, AttributeName, Error, ImageUpload, Recipe, RecipeAttribute,
    RecipeChanges, RecipeDraft, RecipeFilter, RecipeId, UserId,
};

/// Mutating recipe operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeCommand: Send + Sync {
    /// Create a recipe, resolving its nested tags and ingredients.
    async fn create(&self, owner: &UserId, draft: RecipeDraft) -> Result<Recipe, Error>;

    /// Update a recipe. Present collections replace the existing links.
    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Recipe, Error>;

    async fn delete(&self, owner: &UserId, id: RecipeId) -> Result<(), Error>;

    /// Store an image for the recipe, replacing any previous one.
    async fn upload_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        upload: ImageUpload,
    ) -> Result<Recipe, Error>;
}

/// Read-only recipe operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeQuery: Send + Sync {
    async fn list(&self, owner: &UserId, filter: RecipeFilter) -> Result<Vec<Recipe>, Error>;

    async fn get(&self, owner: &UserId, id: RecipeId) -> Result<Recipe, Error>;
}

/// Tag and ingredient management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttributeCatalogue: Send + Sync {
    async fn list(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<RecipeAttribute>, Error>;

    async fn rename(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
        name: AttributeName,
    ) -> Result<RecipeAttribute, Error>;

    async fn delete(&self, owner: &UserId, kind: AttributeKind, id: AttributeId)
    -> Result<(), Error>;
}
