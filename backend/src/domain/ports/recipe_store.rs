//! Driven port for recipe, tag and ingredient persistence.
//!
//! Every operation takes the acting user as a mandatory parameter; adapters
//! must restrict reads and writes to rows owned by that user. Records owned by
//! somebody else are reported exactly like missing ones.
//!
//! Multi-step writes (a recipe plus its resolved tags and ingredients) run
//! through [`RecipeStore::transaction`], which hands the caller a
//! [`RecipeTx`] and commits only when the supplied work succeeds.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::{
    AttributeId, AttributeKind, AttributeName, Error, Recipe, RecipeAttribute, RecipeFields,
    RecipeFilter, RecipeId, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by recipe store adapters.
    pub enum RecipeStoreError {
        /// The store could not be reached.
        Connection { message: String } => "recipe store connection failed: {message}",
        /// A query or mutation failed.
        Query { message: String } => "recipe store query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict { message: String } => "recipe store conflict: {message}",
    }
}

impl From<RecipeStoreError> for Error {
    fn from(error: RecipeStoreError) -> Self {
        match error {
            RecipeStoreError::Connection { message } => {
                Error::service_unavailable(format!("recipe store unavailable: {message}"))
            }
            RecipeStoreError::Query { message } => {
                Error::internal(format!("recipe store error: {message}"))
            }
            RecipeStoreError::Conflict { message } => Error::conflict(message),
        }
    }
}

/// Future returned by transactional work.
pub type TxFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, Error>> + Send + 't>>;

/// Operations available inside a [`RecipeStore::transaction`].
#[async_trait]
pub trait RecipeTx: Send {
    /// Look up an attribute by exact name.
    async fn find_attribute(
        &mut self,
        owner: &UserId,
        kind: AttributeKind,
        name: &AttributeName,
    ) -> Result<Option<RecipeAttribute>, RecipeStoreError>;

    /// Insert an attribute, returning `None` when `(owner, kind, name)`
    /// already exists.
    async fn insert_attribute(
        &mut self,
        owner: &UserId,
        kind: AttributeKind,
        name: &AttributeName,
    ) -> Result<Option<RecipeAttribute>, RecipeStoreError>;

    /// Insert the scalar part of a new recipe.
    async fn insert_recipe(
        &mut self,
        owner: &UserId,
        fields: &RecipeFields,
    ) -> Result<RecipeId, RecipeStoreError>;

    /// Load a recipe with its links.
    async fn find_recipe(
        &mut self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeStoreError>;

    /// Overwrite the scalar part of an existing recipe.
    async fn update_recipe(
        &mut self,
        owner: &UserId,
        id: RecipeId,
        fields: &RecipeFields,
    ) -> Result<(), RecipeStoreError>;

    /// Drop every link of `kind` from the recipe and link `attributes`
    /// instead.
    async fn replace_links(
        &mut self,
        recipe: RecipeId,
        kind: AttributeKind,
        attributes: &[AttributeId],
    ) -> Result<(), RecipeStoreError>;
}

/// Owner-scoped persistence for recipes and their attributes.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Run `work` atomically.
    ///
    /// Changes made through the [`RecipeTx`] are committed when `work`
    /// returns `Ok` and discarded otherwise.
    async fn transaction<T, F>(&self, work: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t mut dyn RecipeTx) -> TxFuture<'t, T> + Send + 'static;

    /// List recipes matching `filter`, newest id first, without duplicates.
    async fn list_recipes(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeStoreError>;

    async fn find_recipe(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeStoreError>;

    /// Delete a recipe and its links. Returns whether a row was removed.
    async fn delete_recipe(&self, owner: &UserId, id: RecipeId) -> Result<bool, RecipeStoreError>;

    /// Store a new image path.
    ///
    /// Returns `None` when the recipe does not exist for `owner`, otherwise
    /// the previously stored path.
    async fn set_recipe_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: &str,
    ) -> Result<Option<Option<String>>, RecipeStoreError>;

    /// List attributes of `kind`, ordered by name descending.
    ///
    /// With `assigned_only`, attributes linked to no recipe are omitted.
    async fn list_attributes(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<RecipeAttribute>, RecipeStoreError>;

    /// Rename an attribute.
    ///
    /// Returns `None` when it does not exist for `owner` and
    /// [`RecipeStoreError::Conflict`] when the name is already taken.
    async fn rename_attribute(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
        name: &AttributeName,
    ) -> Result<Option<RecipeAttribute>, RecipeStoreError>;

    /// Delete an attribute and its links. Returns whether a row was removed.
    async fn delete_attribute(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<bool, RecipeStoreError>;
}
