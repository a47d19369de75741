//! Account endpoints.
//!
//! ```text
//! POST  /api/v1/users     {"email":"cook@example.com","password":"secret","name":"Cook"}
//! POST  /api/v1/login     {"email":"cook@example.com","password":"secret"}
//! POST  /api/v1/logout
//! GET   /api/v1/users/me
//! PATCH /api/v1/users/me  {"name":"Head Cook"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DisplayName, LoginCredentials, NewAccount, Password, ProfileUpdate, User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::user_validation_error;

#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial profile update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Public view of an account. Never carries the password digest.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id(),
            email: user.email().to_string(),
            name: user.name().to_string(),
        }
    }
}

/// Register a new account.
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        email,
        password,
        name,
    } = payload.into_inner();
    let account =
        NewAccount::try_from_parts(&email, &name, &password).map_err(user_validation_error)?;
    let user = state.accounts.register(account).await?;
    Ok(HttpResponse::Created().json(UserBody::from(&user)))
}

/// Authenticate and establish a session.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(user_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserBody>> {
    let user_id = session.require_active_user(state.login.as_ref()).await?;
    let user = state.accounts.profile(&user_id).await?;
    Ok(web::Json(UserBody::from(&user)))
}

#[patch("/users/me")]
pub async fn update_current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserBody>> {
    let user_id = session.require_active_user(state.login.as_ref()).await?;
    let ProfileRequest { name, password } = payload.into_inner();
    let update = ProfileUpdate {
        name: name
            .map(DisplayName::new)
            .transpose()
            .map_err(user_validation_error)?,
        password: password
            .map(Password::new)
            .transpose()
            .map_err(user_validation_error)?,
    };
    let user = state.accounts.update_profile(&user_id, update).await?;
    Ok(web::Json(UserBody::from(&user)))
}
