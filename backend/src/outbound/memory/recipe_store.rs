//! In-memory [`RecipeStore`] used when no database is configured.
//!
//! A single async mutex guards the whole state. Transactions work on a copy
//! and swap it in on success, so they are serialised and atomic.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ports::{RecipeStore, RecipeStoreError, RecipeTx, TxFuture};
use crate::domain::{
    AttributeId, AttributeKind, AttributeName, Error, Recipe, RecipeAttribute, RecipeFields,
    RecipeFilter, RecipeId, RecipeParts, UserId,
};

#[derive(Debug, Clone)]
struct RecipeRow {
    owner: UserId,
    fields: RecipeFields,
    image: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct State {
    last_recipe_id: i64,
    last_attribute_id: i64,
    recipes: BTreeMap<RecipeId, RecipeRow>,
    attributes: BTreeMap<AttributeId, RecipeAttribute>,
    links: BTreeSet<(RecipeId, AttributeId)>,
}

impl State {
    fn owned_attribute(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Option<&RecipeAttribute> {
        self.attributes
            .get(&id)
            .filter(|attr| attr.owner() == owner && attr.kind() == kind)
    }

    fn attribute_named(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        name: &AttributeName,
    ) -> Option<&RecipeAttribute> {
        self.attributes
            .values()
            .find(|attr| attr.owner() == owner && attr.kind() == kind && attr.name() == name)
    }

    fn linked(&self, recipe: RecipeId, kind: AttributeKind) -> Vec<RecipeAttribute> {
        self.links
            .range((recipe, AttributeId::new(i64::MIN))..=(recipe, AttributeId::new(i64::MAX)))
            .filter_map(|(_, attr)| self.attributes.get(attr))
            .filter(|attr| attr.kind() == kind)
            .cloned()
            .collect()
    }

    fn load(&self, owner: &UserId, id: RecipeId) -> Option<Recipe> {
        let row = self.recipes.get(&id).filter(|row| &row.owner == owner)?;
        Some(Recipe::from(RecipeParts {
            id,
            owner: row.owner,
            fields: row.fields.clone(),
            image: row.image.clone(),
            tags: self.linked(id, AttributeKind::Tag),
            ingredients: self.linked(id, AttributeKind::Ingredient),
        }))
    }
}

/// Process-local recipe store.
#[derive(Debug, Default)]
pub struct MemoryRecipeStore {
    state: Mutex<State>,
}

struct MemoryTx<'a> {
    state: &'a mut State,
}

#[async_trait]
impl RecipeTx for MemoryTx<'_> {
    async fn find_attribute(
        &mut self,
        owner: &UserId,
        kind: AttributeKind,
        name: &AttributeName,
    ) -> Result<Option<RecipeAttribute>, RecipeStoreError> {
        Ok(self.state.attribute_named(owner, kind, name).cloned())
    }

    async fn insert_attribute(
        &mut self,
        owner: &UserId,
        kind: AttributeKind,
        name: &AttributeName,
    ) -> Result<Option<RecipeAttribute>, RecipeStoreError> {
        if self.state.attribute_named(owner, kind, name).is_some() {
            return Ok(None);
        }
        self.state.last_attribute_id += 1;
        let id = AttributeId::new(self.state.last_attribute_id);
        let attribute = RecipeAttribute::new(id, *owner, kind, name.clone());
        self.state.attributes.insert(id, attribute.clone());
        Ok(Some(attribute))
    }

    async fn insert_recipe(
        &mut self,
        owner: &UserId,
        fields: &RecipeFields,
    ) -> Result<RecipeId, RecipeStoreError> {
        self.state.last_recipe_id += 1;
        let id = RecipeId::new(self.state.last_recipe_id);
        self.state.recipes.insert(
            id,
            RecipeRow {
                owner: *owner,
                fields: fields.clone(),
                image: None,
            },
        );
        Ok(id)
    }

    async fn find_recipe(
        &mut self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeStoreError> {
        Ok(self.state.load(owner, id))
    }

    async fn update_recipe(
        &mut self,
        owner: &UserId,
        id: RecipeId,
        fields: &RecipeFields,
    ) -> Result<(), RecipeStoreError> {
        match self.state.recipes.get_mut(&id) {
            Some(row) if &row.owner == owner => {
                row.fields = fields.clone();
                Ok(())
            }
            _ => Err(RecipeStoreError::query(format!("recipe {id} is not writable"))),
        }
    }

    async fn replace_links(
        &mut self,
        recipe: RecipeId,
        kind: AttributeKind,
        attributes: &[AttributeId],
    ) -> Result<(), RecipeStoreError> {
        let state = &mut *self.state;
        let stale: Vec<_> = state
            .links
            .iter()
            .filter(|(linked_recipe, attr)| {
                *linked_recipe == recipe
                    && state.attributes.get(attr).is_some_and(|a| a.kind() == kind)
            })
            .copied()
            .collect();
        for link in stale {
            state.links.remove(&link);
        }
        state
            .links
            .extend(attributes.iter().map(|attr| (recipe, *attr)));
        Ok(())
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn transaction<T, F>(&self, work: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t mut dyn RecipeTx) -> TxFuture<'t, T> + Send + 'static,
    {
        let mut guard = self.state.lock().await;
        let mut draft = guard.clone();
        let result = {
            let mut tx = MemoryTx { state: &mut draft };
            work(&mut tx).await
        };
        if result.is_ok() {
            *guard = draft;
        }
        result
    }

    async fn list_recipes(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeStoreError> {
        let state = self.state.lock().await;
        Ok(state
            .recipes
            .keys()
            .rev()
            .filter_map(|id| state.load(owner, *id))
            .filter(|recipe| filter.matches(recipe))
            .collect())
    }

    async fn find_recipe(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeStoreError> {
        Ok(self.state.lock().await.load(owner, id))
    }

    async fn delete_recipe(&self, owner: &UserId, id: RecipeId) -> Result<bool, RecipeStoreError> {
        let mut state = self.state.lock().await;
        if state.recipes.get(&id).is_none_or(|row| &row.owner != owner) {
            return Ok(false);
        }
        state.recipes.remove(&id);
        state.links.retain(|(recipe, _)| *recipe != id);
        Ok(true)
    }

    async fn set_recipe_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: &str,
    ) -> Result<Option<Option<String>>, RecipeStoreError> {
        let mut state = self.state.lock().await;
        Ok(state
            .recipes
            .get_mut(&id)
            .filter(|row| &row.owner == owner)
            .map(|row| row.image.replace(image.to_owned())))
    }

    async fn list_attributes(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<RecipeAttribute>, RecipeStoreError> {
        let state = self.state.lock().await;
        let mut attributes: Vec<RecipeAttribute> = state
            .attributes
            .values()
            .filter(|attr| attr.owner() == owner && attr.kind() == kind)
            .filter(|attr| !assigned_only || state.links.iter().any(|(_, id)| *id == attr.id()))
            .cloned()
            .collect();
        attributes.sort_by(|a, b| {
            b.name()
                .as_ref()
                .cmp(a.name().as_ref())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(attributes)
    }

    async fn rename_attribute(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
        name: &AttributeName,
    ) -> Result<Option<RecipeAttribute>, RecipeStoreError> {
        let mut state = self.state.lock().await;
        if state.owned_attribute(owner, kind, id).is_none() {
            return Ok(None);
        }
        if state
            .attribute_named(owner, kind, name)
            .is_some_and(|other| other.id() != id)
        {
            return Err(RecipeStoreError::conflict(format!(
                "{kind} {:?} already exists",
                name.as_ref()
            )));
        }
        let renamed = RecipeAttribute::new(id, *owner, kind, name.clone());
        state.attributes.insert(id, renamed.clone());
        Ok(Some(renamed))
    }

    async fn delete_attribute(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<bool, RecipeStoreError> {
        let mut state = self.state.lock().await;
        if state.owned_attribute(owner, kind, id).is_none() {
            return Ok(false);
        }
        state.attributes.remove(&id);
        state.links.retain(|(_, attr)| *attr != id);
        Ok(true)
    }
}
