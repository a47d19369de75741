//! Tag and ingredient management for the acting user.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{AttributeCatalogue, RecipeStore, RecipeStoreError};
use crate::domain::{AttributeId, AttributeKind, AttributeName, Error, RecipeAttribute, UserId};

/// Service implementing [`AttributeCatalogue`] over a [`RecipeStore`].
#[derive(Clone)]
pub struct AttributeService<S> {
    store: Arc<S>,
}

impl<S> AttributeService<S> {
    /// Build the catalogue over the store shared with the recipe service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

fn attribute_not_found(kind: AttributeKind, id: AttributeId) -> Error {
    Error::not_found(format!("{kind} {id} not found"))
}

#[async_trait]
impl<S> AttributeCatalogue for AttributeService<S>
where
    S: RecipeStore + 'static,
{
    async fn list(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<RecipeAttribute>, Error> {
        Ok(self.store.list_attributes(owner, kind, assigned_only).await?)
    }

    async fn rename(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
        name: AttributeName,
    ) -> Result<RecipeAttribute, Error> {
        match self.store.rename_attribute(owner, kind, id, &name).await {
            Ok(Some(attribute)) => Ok(attribute),
            Ok(None) => Err(attribute_not_found(kind, id)),
            Err(RecipeStoreError::Conflict { .. }) => Err(Error::conflict(format!(
                "a {kind} named {:?} already exists",
                name.as_ref()
            ))
            .with_details(json!({
                "field": kind.name_field(),
                "code": "duplicate",
            }))),
            Err(other) => Err(other.into()),
        }
    }

    async fn delete(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<(), Error> {
        if !self.store.delete_attribute(owner, kind, id).await? {
            return Err(attribute_not_found(kind, id));
        }
        info!(%owner, %kind, %id, "attribute deleted");
        Ok(())
    }
}
