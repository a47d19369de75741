//! Recipe use-cases: create, update, delete, query and image upload.
//!
//! Writes that touch nested collections run in one store transaction so a
//! failure while resolving a tag or ingredient leaves nothing behind.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{ImageStore, ImageStoreError, RecipeCommand, RecipeQuery, RecipeStore};
use crate::domain::resolver::resolve_all;
use crate::domain::{
    AttributeKind, Error, ImageUpload, Recipe, RecipeChanges, RecipeDraft, RecipeFilter, RecipeId,
    UserId, recipe_image_path,
};

/// Recipe service implementing [`RecipeCommand`] and [`RecipeQuery`].
#[derive(Clone)]
pub struct RecipeService<S, M> {
    store: Arc<S>,
    images: Arc<M>,
}

impl<S, M> RecipeService<S, M> {
    /// Build the service over a recipe store and the image store that holds
    /// uploaded files.
    pub fn new(store: Arc<S>, images: Arc<M>) -> Self {
        Self { store, images }
    }
}

fn recipe_not_found(id: RecipeId) -> Error {
    Error::not_found(format!("recipe {id} not found"))
}

fn map_image_error(error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::InvalidPath { path } => {
            Error::internal(format!("refused image path {path}"))
        }
        ImageStoreError::Io { message } => {
            Error::service_unavailable(format!("image storage unavailable: {message}"))
        }
    }
}

#[async_trait]
impl<S, M> RecipeCommand for RecipeService<S, M>
where
    S: RecipeStore + 'static,
    M: ImageStore + 'static,
{
    async fn create(&self, owner: &UserId, draft: RecipeDraft) -> Result<Recipe, Error> {
        let owner = *owner;
        let recipe = self
            .store
            .transaction(move |tx| {
                Box::pin(async move {
                    let RecipeDraft {
                        fields,
                        tags,
                        ingredients,
                    } = draft;
                    let id = tx.insert_recipe(&owner, &fields).await?;
                    let ingredient_ids =
                        resolve_all(tx, &owner, AttributeKind::Ingredient, &ingredients).await?;
                    tx.replace_links(id, AttributeKind::Ingredient, &ingredient_ids)
                        .await?;
                    let tag_ids = resolve_all(tx, &owner, AttributeKind::Tag, &tags).await?;
                    tx.replace_links(id, AttributeKind::Tag, &tag_ids).await?;
                    tx.find_recipe(&owner, id)
                        .await?
                        .ok_or_else(|| Error::internal(format!("recipe {id} missing after insert")))
                })
            })
            .await?;
        info!(%owner, recipe_id = %recipe.id(), "recipe created");
        Ok(recipe)
    }

    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Recipe, Error> {
        let owner = *owner;
        self.store
            .transaction(move |tx| {
                Box::pin(async move {
                    let current = tx
                        .find_recipe(&owner, id)
                        .await?
                        .ok_or_else(|| recipe_not_found(id))?;
                    if let Some(tags) = &changes.tags {
                        let ids = resolve_all(tx, &owner, AttributeKind::Tag, tags).await?;
                        tx.replace_links(id, AttributeKind::Tag, &ids).await?;
                    }
                    if let Some(ingredients) = &changes.ingredients {
                        let ids =
                            resolve_all(tx, &owner, AttributeKind::Ingredient, ingredients).await?;
                        tx.replace_links(id, AttributeKind::Ingredient, &ids).await?;
                    }
                    let mut fields = current.fields().clone();
                    changes.apply_scalars(&mut fields);
                    tx.update_recipe(&owner, id, &fields).await?;
                    tx.find_recipe(&owner, id)
                        .await?
                        .ok_or_else(|| recipe_not_found(id))
                })
            })
            .await
    }

    async fn delete(&self, owner: &UserId, id: RecipeId) -> Result<(), Error> {
        let existing = self
            .store
            .find_recipe(owner, id)
            .await?
            .ok_or_else(|| recipe_not_found(id))?;
        if !self.store.delete_recipe(owner, id).await? {
            return Err(recipe_not_found(id));
        }
        if let Some(path) = existing.image() {
            self.remove_image_quietly(path).await;
        }
        Ok(())
    }

    async fn upload_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        upload: ImageUpload,
    ) -> Result<Recipe, Error> {
        self.store
            .find_recipe(owner, id)
            .await?
            .ok_or_else(|| recipe_not_found(id))?;

        let path = recipe_image_path(upload.filename());
        self.images
            .save(&path, upload.into_bytes())
            .await
            .map_err(map_image_error)?;

        let previous = match self.store.set_recipe_image(owner, id, &path).await {
            Ok(Some(previous)) => previous,
            Ok(None) => {
                self.remove_image_quietly(&path).await;
                return Err(recipe_not_found(id));
            }
            Err(err) => {
                self.remove_image_quietly(&path).await;
                return Err(err.into());
            }
        };
        if let Some(old) = previous.filter(|old| old != &path) {
            self.remove_image_quietly(&old).await;
        }
        info!(%owner, recipe_id = %id, image = %path, "recipe image stored");
        self.store
            .find_recipe(owner, id)
            .await?
            .ok_or_else(|| recipe_not_found(id))
    }
}

impl<S, M> RecipeService<S, M>
where
    M: ImageStore,
{
    async fn remove_image_quietly(&self, path: &str) {
        if let Err(error) = self.images.remove(path).await {
            warn!(%error, path, "failed to remove recipe image");
        }
    }
}

#[async_trait]
impl<S, M> RecipeQuery for RecipeService<S, M>
where
    S: RecipeStore + 'static,
    M: ImageStore + 'static,
{
    async fn list(&self, owner: &UserId, filter: RecipeFilter) -> Result<Vec<Recipe>, Error> {
        Ok(self.store.list_recipes(owner, &filter).await?)
    }

    async fn get(&self, owner: &UserId, id: RecipeId) -> Result<Recipe, Error> {
        self.store
            .find_recipe(owner, id)
            .await?
            .ok_or_else(|| recipe_not_found(id))
    }
}

#[cfg(test)]
mod tests;
