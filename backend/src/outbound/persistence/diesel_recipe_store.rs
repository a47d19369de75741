//! PostgreSQL-backed [`RecipeStore`].
//!
//! Tags and ingredients live in separate tables with separate link tables;
//! [`by_kind!`] picks the pair for an [`AttributeKind`] so every query is
//! written once. Owner scoping is applied in SQL: rows of another user never
//! leave the database.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{RecipeStore, RecipeStoreError, RecipeTx, TxFuture};
use crate::domain::{
    AttributeId, AttributeKind, AttributeName, Error, Recipe, RecipeAttribute, RecipeFields,
    RecipeFilter, RecipeId, RecipeParts, UserId,
};

use super::diesel_helpers::DieselFailure;
use super::models::{AttributeRow, RecipeRow, RecipeValues};
use super::pool::DbPool;
use super::schema::{recipe_ingredients, recipe_tags, recipes};

/// Bind `$attrs` to the attribute table, `$links` to its link table and
/// `$link_attr` to the link column referencing the attribute.
macro_rules! by_kind {
    ($kind:expr, |$attrs:ident, $links:ident, $link_attr:ident| $body:expr) => {
        match $kind {
            AttributeKind::Tag => {
                #[allow(unused_imports, reason = "not every query touches every table")]
                use super::schema::recipe_tags as $links;
                #[allow(unused_imports, reason = "not every query touches every table")]
                use super::schema::recipe_tags::tag_id as $link_attr;
                #[allow(unused_imports, reason = "not every query touches every table")]
                use super::schema::tags as $attrs;
                $body
            }
            AttributeKind::Ingredient => {
                #[allow(unused_imports, reason = "not every query touches every table")]
                use super::schema::ingredients as $attrs;
                #[allow(unused_imports, reason = "not every query touches every table")]
                use super::schema::recipe_ingredients as $links;
                #[allow(unused_imports, reason = "not every query touches every table")]
                use super::schema::recipe_ingredients::ingredient_id as $link_attr;
                $body
            }
        }
    };
}

type StoreResult<T> = Result<T, RecipeStoreError>;

fn corrupt_row(message: String) -> RecipeStoreError {
    RecipeStoreError::query(message)
}

fn to_attributes(rows: Vec<AttributeRow>, kind: AttributeKind) -> StoreResult<Vec<RecipeAttribute>> {
    rows.into_iter()
        .map(|row| row.into_domain(kind).map_err(corrupt_row))
        .collect()
}

/// Links of `kind` for `recipe_ids`, grouped by recipe.
async fn load_links(
    conn: &mut AsyncPgConnection,
    kind: AttributeKind,
    recipe_ids: &[i64],
) -> StoreResult<HashMap<i64, Vec<RecipeAttribute>>> {
    let rows: Vec<(i64, AttributeRow)> = by_kind!(kind, |attrs, links, link_attr| {
        links::table
            .inner_join(attrs::table.on(attrs::id.eq(link_attr)))
            .filter(links::recipe_id.eq_any(recipe_ids))
            .select((links::recipe_id, (attrs::id, attrs::user_id, attrs::name)))
            .order_by(attrs::id.asc())
            .load(conn)
            .await
    })
    .map_err(RecipeStoreError::from_diesel)?;

    let mut grouped: HashMap<i64, Vec<RecipeAttribute>> = HashMap::new();
    for (recipe_id, row) in rows {
        let attribute = row.into_domain(kind).map_err(corrupt_row)?;
        grouped.entry(recipe_id).or_default().push(attribute);
    }
    Ok(grouped)
}

/// Attach tags and ingredients to recipe rows, preserving row order.
async fn assemble(
    conn: &mut AsyncPgConnection,
    rows: Vec<RecipeRow>,
) -> StoreResult<Vec<Recipe>> {
    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
    let mut tags = load_links(conn, AttributeKind::Tag, &ids).await?;
    let mut ingredients = load_links(conn, AttributeKind::Ingredient, &ids).await?;

    rows.into_iter()
        .map(|row| {
            let (id, owner) = (row.id(), row.owner());
            let (fields, image) = row.into_fields().map_err(corrupt_row)?;
            Ok(Recipe::from(RecipeParts {
                id,
                owner,
                fields,
                image,
                tags: tags.remove(&id.get()).unwrap_or_default(),
                ingredients: ingredients.remove(&id.get()).unwrap_or_default(),
            }))
        })
        .collect()
}

async fn load_recipe(
    conn: &mut AsyncPgConnection,
    owner: &UserId,
    id: RecipeId,
) -> StoreResult<Option<Recipe>> {
    let row = recipes::table
        .filter(recipes::id.eq(id.get()))
        .filter(recipes::user_id.eq(*owner.as_uuid()))
        .select(RecipeRow::as_select())
        .first(conn)
        .await
        .optional()
        .map_err(RecipeStoreError::from_diesel)?;
    let Some(row) = row else {
        return Ok(None);
    };
    Ok(assemble(conn, vec![row]).await?.pop())
}

/// Transaction handle bound to one pooled connection.
struct DieselRecipeTx<'c> {
    conn: &'c mut AsyncPgConnection,
}

#[async_trait]
impl RecipeTx for DieselRecipeTx<'_> {
    async fn find_attribute(
        &mut self,
        owner: &UserId,
        kind: AttributeKind,
        name: &AttributeName,
    ) -> Result<Option<RecipeAttribute>, RecipeStoreError> {
        let conn = &mut *self.conn;
        let row: Option<AttributeRow> = by_kind!(kind, |attrs, _links, _link_attr| {
            attrs::table
                .filter(attrs::user_id.eq(*owner.as_uuid()))
                .filter(attrs::name.eq(name.as_ref()))
                .select((attrs::id, attrs::user_id, attrs::name))
                .first(conn)
                .await
                .optional()
        })
        .map_err(RecipeStoreError::from_diesel)?;
        row.map(|row| row.into_domain(kind).map_err(corrupt_row))
            .transpose()
    }

    async fn insert_attribute(
        &mut self,
        owner: &UserId,
        kind: AttributeKind,
        name: &AttributeName,
    ) -> Result<Option<RecipeAttribute>, RecipeStoreError> {
        let conn = &mut *self.conn;
        let row: Option<AttributeRow> = by_kind!(kind, |attrs, _links, _link_attr| {
            diesel::insert_into(attrs::table)
                .values((
                    attrs::user_id.eq(*owner.as_uuid()),
                    attrs::name.eq(name.as_ref()),
                ))
                .on_conflict((attrs::user_id, attrs::name))
                .do_nothing()
                .returning((attrs::id, attrs::user_id, attrs::name))
                .get_result(conn)
                .await
                .optional()
        })
        .map_err(RecipeStoreError::from_diesel)?;
        if row.is_none() {
            debug!(%owner, %kind, "attribute insert lost to an existing row");
        }
        row.map(|row| row.into_domain(kind).map_err(corrupt_row))
            .transpose()
    }

    async fn insert_recipe(
        &mut self,
        owner: &UserId,
        fields: &RecipeFields,
    ) -> Result<RecipeId, RecipeStoreError> {
        let id: i64 = diesel::insert_into(recipes::table)
            .values((
                recipes::user_id.eq(*owner.as_uuid()),
                RecipeValues::from(fields),
            ))
            .returning(recipes::id)
            .get_result(&mut *self.conn)
            .await
            .map_err(RecipeStoreError::from_diesel)?;
        Ok(RecipeId::new(id))
    }

    async fn find_recipe(
        &mut self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeStoreError> {
        load_recipe(&mut *self.conn, owner, id).await
    }

    async fn update_recipe(
        &mut self,
        owner: &UserId,
        id: RecipeId,
        fields: &RecipeFields,
    ) -> Result<(), RecipeStoreError> {
        let updated = diesel::update(
            recipes::table
                .filter(recipes::id.eq(id.get()))
                .filter(recipes::user_id.eq(*owner.as_uuid())),
        )
        .set(RecipeValues::from(fields))
        .execute(&mut *self.conn)
        .await
        .map_err(RecipeStoreError::from_diesel)?;
        if updated == 0 {
            return Err(RecipeStoreError::query(format!(
                "recipe {id} is not writable"
            )));
        }
        Ok(())
    }

    async fn replace_links(
        &mut self,
        recipe: RecipeId,
        kind: AttributeKind,
        attributes: &[AttributeId],
    ) -> Result<(), RecipeStoreError> {
        let conn = &mut *self.conn;
        by_kind!(kind, |_attrs, links, link_attr| {
            diesel::delete(links::table.filter(links::recipe_id.eq(recipe.get())))
                .execute(&mut *conn)
                .await
                .map_err(RecipeStoreError::from_diesel)?;
            if attributes.is_empty() {
                return Ok(());
            }
            let values: Vec<_> = attributes
                .iter()
                .map(|attr| (links::recipe_id.eq(recipe.get()), link_attr.eq(attr.get())))
                .collect();
            diesel::insert_into(links::table)
                .values(values)
                .on_conflict_do_nothing()
                .execute(conn)
                .await
                .map_err(RecipeStoreError::from_diesel)?;
        });
        Ok(())
    }
}

/// Rolls a transaction back for either reason.
enum TxAbort {
    Diesel(diesel::result::Error),
    Domain(Error),
}

impl From<diesel::result::Error> for TxAbort {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

/// Diesel implementation of [`RecipeStore`].
#[derive(Clone)]
pub struct DieselRecipeStore {
    pool: DbPool,
}

impl DieselRecipeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for DieselRecipeStore {
    async fn transaction<T, F>(&self, work: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t mut dyn RecipeTx) -> TxFuture<'t, T> + Send + 'static,
    {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(RecipeStoreError::from_pool)?;
        conn.transaction(|conn| {
            async move {
                let mut tx = DieselRecipeTx { conn };
                work(&mut tx).await.map_err(TxAbort::Domain)
            }
            .scope_boxed()
        })
        .await
        .map_err(|abort| match abort {
            TxAbort::Diesel(err) => RecipeStoreError::from_diesel(err).into(),
            TxAbort::Domain(err) => err,
        })
    }

    async fn list_recipes(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeStoreError> {
        let mut conn = self.pool.get().await.map_err(RecipeStoreError::from_pool)?;

        let mut query = recipes::table
            .filter(recipes::user_id.eq(*owner.as_uuid()))
            .select(RecipeRow::as_select())
            .order_by(recipes::id.desc())
            .into_boxed();
        if !filter.tags.is_empty() {
            let wanted: Vec<i64> = filter.tags.iter().map(|id| id.get()).collect();
            query = query.filter(
                recipes::id.eq_any(
                    recipe_tags::table
                        .filter(recipe_tags::tag_id.eq_any(wanted))
                        .select(recipe_tags::recipe_id),
                ),
            );
        }
        if !filter.ingredients.is_empty() {
            let wanted: Vec<i64> = filter.ingredients.iter().map(|id| id.get()).collect();
            query = query.filter(
                recipes::id.eq_any(
                    recipe_ingredients::table
                        .filter(recipe_ingredients::ingredient_id.eq_any(wanted))
                        .select(recipe_ingredients::recipe_id),
                ),
            );
        }

        let rows = query.load(&mut conn).await.map_err(RecipeStoreError::from_diesel)?;
        assemble(&mut conn, rows).await
    }

    async fn find_recipe(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeStoreError> {
        let mut conn = self.pool.get().await.map_err(RecipeStoreError::from_pool)?;
        load_recipe(&mut conn, owner, id).await
    }

    async fn delete_recipe(&self, owner: &UserId, id: RecipeId) -> Result<bool, RecipeStoreError> {
        let mut conn = self.pool.get().await.map_err(RecipeStoreError::from_pool)?;
        let deleted = diesel::delete(
            recipes::table
                .filter(recipes::id.eq(id.get()))
                .filter(recipes::user_id.eq(*owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(RecipeStoreError::from_diesel)?;
        Ok(deleted > 0)
    }

    async fn set_recipe_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: &str,
    ) -> Result<Option<Option<String>>, RecipeStoreError> {
        let mut conn = self.pool.get().await.map_err(RecipeStoreError::from_pool)?;
        let owner = *owner.as_uuid();
        let image = image.to_owned();
        conn.transaction(|conn| {
            async move {
                let owned = recipes::table
                    .filter(recipes::id.eq(id.get()))
                    .filter(recipes::user_id.eq(owner));
                let previous: Option<Option<String>> = owned
                    .clone()
                    .select(recipes::image)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if previous.is_some() {
                    diesel::update(owned)
                        .set(recipes::image.eq(Some(image)))
                        .execute(conn)
                        .await?;
                }
                Ok(previous)
            }
            .scope_boxed()
        })
        .await
        .map_err(RecipeStoreError::from_diesel)
    }

    async fn list_attributes(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        assigned_only: bool,
    ) -> Result<Vec<RecipeAttribute>, RecipeStoreError> {
        let mut conn = self.pool.get().await.map_err(RecipeStoreError::from_pool)?;
        let rows: Vec<AttributeRow> = by_kind!(kind, |attrs, links, link_attr| {
            let mut query = attrs::table
                .filter(attrs::user_id.eq(*owner.as_uuid()))
                .select((attrs::id, attrs::user_id, attrs::name))
                .order_by((attrs::name.desc(), attrs::id.desc()))
                .into_boxed();
            if assigned_only {
                query = query.filter(exists(links::table.filter(link_attr.eq(attrs::id))));
            }
            query.load(&mut conn).await
        })
        .map_err(RecipeStoreError::from_diesel)?;
        to_attributes(rows, kind)
    }

    async fn rename_attribute(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
        name: &AttributeName,
    ) -> Result<Option<RecipeAttribute>, RecipeStoreError> {
        let mut conn = self.pool.get().await.map_err(RecipeStoreError::from_pool)?;
        let row: Option<AttributeRow> = by_kind!(kind, |attrs, _links, _link_attr| {
            diesel::update(
                attrs::table
                    .filter(attrs::id.eq(id.get()))
                    .filter(attrs::user_id.eq(*owner.as_uuid())),
            )
            .set(attrs::name.eq(name.as_ref()))
            .returning((attrs::id, attrs::user_id, attrs::name))
            .get_result(&mut conn)
            .await
            .optional()
        })
        .map_err(RecipeStoreError::from_diesel)?;
        row.map(|row| row.into_domain(kind).map_err(corrupt_row))
            .transpose()
    }

    async fn delete_attribute(
        &self,
        owner: &UserId,
        kind: AttributeKind,
        id: AttributeId,
    ) -> Result<bool, RecipeStoreError> {
        let mut conn = self.pool.get().await.map_err(RecipeStoreError::from_pool)?;
        let deleted = by_kind!(kind, |attrs, _links, _link_attr| {
            diesel::delete(
                attrs::table
                    .filter(attrs::id.eq(id.get()))
                    .filter(attrs::user_id.eq(*owner.as_uuid())),
            )
            .execute(&mut conn)
            .await
        })
        .map_err(RecipeStoreError::from_diesel)?;
        Ok(deleted > 0)
    }
}
