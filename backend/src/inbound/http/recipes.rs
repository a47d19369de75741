//! Recipe endpoints.
//!
//! ```text
//! GET    /api/v1/recipes?tags=1,2&ingredients=3
//! POST   /api/v1/recipes
//! GET    /api/v1/recipes/{id}
//! PUT    /api/v1/recipes/{id}
//! PATCH  /api/v1/recipes/{id}
//! DELETE /api/v1/recipes/{id}
//! POST   /api/v1/recipes/{id}/upload-image?filename=dish.jpg
//! ```
//!
//! Every route is scoped to the session user; another user's recipe is
//! reported as not found.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};

use crate::domain::{AttributeId, ImageUpload, RecipeFilter, RecipeId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::recipes_dto::{
    ImageQuery, RecipeDetail, RecipeImageBody, RecipeListQuery, RecipePayload, RecipeSummary,
    UpdateMode,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{image_validation_error, parse_id_list};

fn filter_from(query: &RecipeListQuery) -> ApiResult<RecipeFilter> {
    let ids = |raw: Option<&String>, field: &str| {
        parse_id_list(raw.map(String::as_str), field)
            .map(|ids| ids.into_iter().map(AttributeId::new).collect::<Vec<_>>())
    };
    Ok(RecipeFilter {
        tags: ids(query.tags.as_ref(), "tags")?,
        ingredients: ids(query.ingredients.as_ref(), "ingredients")?,
    })
}

/// List the caller's recipes, newest first.
#[get("/recipes")]
pub async fn list_recipes(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<RecipeListQuery>,
) -> ApiResult<web::Json<Vec<RecipeSummary>>> {
    let owner = session.require_active_user(state.login.as_ref()).await?;
    let filter = filter_from(&query)?;
    let recipes = state.recipes_query.list(&owner, filter).await?;
    Ok(web::Json(recipes.iter().map(RecipeSummary::from).collect()))
}

/// Create a recipe together with its nested tags and ingredients.
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RecipePayload>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_active_user(state.login.as_ref()).await?;
    let draft = payload.into_inner().into_draft()?;
    let recipe = state.recipes.create(&owner, draft).await?;
    Ok(HttpResponse::Created().json(RecipeDetail::from(&recipe)))
}

#[get("/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<RecipeDetail>> {
    let owner = session.require_active_user(state.login.as_ref()).await?;
    let recipe = state
        .recipes_query
        .get(&owner, RecipeId::new(path.into_inner()))
        .await?;
    Ok(web::Json(RecipeDetail::from(&recipe)))
}

async fn apply_update(
    state: &HttpState,
    session: &SessionContext,
    id: i64,
    payload: RecipePayload,
    mode: UpdateMode,
) -> ApiResult<web::Json<RecipeDetail>> {
    let owner = session.require_active_user(state.login.as_ref()).await?;
    let changes = payload.into_changes(mode)?;
    let recipe = state
        .recipes
        .update(&owner, RecipeId::new(id), changes)
        .await?;
    Ok(web::Json(RecipeDetail::from(&recipe)))
}

/// Full update. Title, cooking time and price must be present.
#[put("/recipes/{id}")]
pub async fn replace_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RecipePayload>,
) -> ApiResult<web::Json<RecipeDetail>> {
    apply_update(
        &state,
        &session,
        path.into_inner(),
        payload.into_inner(),
        UpdateMode::Replace,
    )
    .await
}

#[patch("/recipes/{id}")]
pub async fn patch_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RecipePayload>,
) -> ApiResult<web::Json<RecipeDetail>> {
    apply_update(
        &state,
        &session,
        path.into_inner(),
        payload.into_inner(),
        UpdateMode::Partial,
    )
    .await
}

#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_active_user(state.login.as_ref()).await?;
    state
        .recipes
        .delete(&owner, RecipeId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Store the request body as the recipe's image.
///
/// The body is the raw file; `Content-Type` must be an `image/*` type. The
/// optional `filename` query parameter only contributes its extension.
#[post("/recipes/{id}/upload-image")]
pub async fn upload_recipe_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<ImageQuery>,
    body: web::Bytes,
) -> ApiResult<web::Json<RecipeImageBody>> {
    let owner = session.require_active_user(state.login.as_ref()).await?;
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let filename = query.into_inner().filename.unwrap_or_default();
    let upload = ImageUpload::try_new(filename, content_type, body.to_vec(), state.max_upload_bytes)
        .map_err(image_validation_error)?;
    let recipe = state
        .recipes
        .upload_image(&owner, RecipeId::new(path.into_inner()), upload)
        .await?;
    Ok(web::Json(RecipeImageBody::from(&recipe)))
}

#[cfg(test)]
mod tests;
