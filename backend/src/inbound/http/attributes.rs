//! Tag and ingredient endpoints.
//!
//! Both resources share one set of handlers parameterised by
//! [`AttributeKind`]; tags are named by `label`, ingredients by `name`.
//!
//! ```text
//! GET          /api/v1/tags?assigned_only=1
//! PUT | PATCH  /api/v1/tags/{id}         {"label": "Vegan"}
//! DELETE       /api/v1/tags/{id}
//! GET          /api/v1/ingredients?assigned_only=1
//! PUT | PATCH  /api/v1/ingredients/{id}  {"name": "Salt"}
//! DELETE       /api/v1/ingredients/{id}
//! ```

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::domain::{AttributeId, AttributeKind, AttributeName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::recipes_dto::AttributeBody;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    attribute_validation_error, missing_field_error, parse_flag,
};

#[derive(Debug, Default, Deserialize)]
pub struct AttributeListQuery {
    pub assigned_only: Option<String>,
}

/// Rename payload. Either key is accepted for both kinds.
#[derive(Debug, Default, Deserialize)]
pub struct RenameRequest {
    #[serde(alias = "name")]
    pub label: Option<String>,
}

async fn list(
    kind: AttributeKind,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AttributeListQuery>,
) -> ApiResult<web::Json<Vec<AttributeBody>>> {
    let owner = session.require_active_user(state.login.as_ref()).await?;
    let assigned_only = parse_flag(query.assigned_only.as_deref(), "assigned_only")?;
    let attributes = state.attributes.list(&owner, kind, assigned_only).await?;
    Ok(web::Json(attributes.iter().map(AttributeBody::from).collect()))
}

async fn rename(
    kind: AttributeKind,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<RenameRequest>,
) -> ApiResult<web::Json<AttributeBody>> {
    let owner = session.require_active_user(state.login.as_ref()).await?;
    let raw = payload
        .into_inner()
        .label
        .ok_or_else(|| missing_field_error(kind.name_field()))?;
    let name =
        AttributeName::new(raw).map_err(|err| attribute_validation_error(kind, None, err))?;
    let renamed = state
        .attributes
        .rename(&owner, kind, AttributeId::new(path.into_inner()), name)
        .await?;
    Ok(web::Json(AttributeBody::from(&renamed)))
}

async fn remove(
    kind: AttributeKind,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_active_user(state.login.as_ref()).await?;
    state
        .attributes
        .delete(&owner, kind, AttributeId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the routes for `kind` under `/{collection}`.
fn attribute_routes(kind: AttributeKind) -> actix_web::Scope {
    let rename_handler = move |state: web::Data<HttpState>,
                               session: SessionContext,
                               path: web::Path<i64>,
                               payload: web::Json<RenameRequest>| {
        rename(kind, state, session, path, payload)
    };
    web::scope(&format!("/{}", kind.collection_field()))
        .route(
            "",
            web::get().to(
                move |state: web::Data<HttpState>,
                      session: SessionContext,
                      query: web::Query<AttributeListQuery>| {
                    list(kind, state, session, query)
                },
            ),
        )
        .route("/{id}", web::put().to(rename_handler))
        .route("/{id}", web::patch().to(rename_handler))
        .route(
            "/{id}",
            web::delete().to(
                move |state: web::Data<HttpState>, session: SessionContext, path: web::Path<i64>| {
                    remove(kind, state, session, path)
                },
            ),
        )
}

/// `/tags` routes.
pub fn tag_routes() -> actix_web::Scope {
    attribute_routes(AttributeKind::Tag)
}

/// `/ingredients` routes.
pub fn ingredient_routes() -> actix_web::Scope {
    attribute_routes(AttributeKind::Ingredient)
}
