//! Login, logout, and the current actor's profile.
//!
//! ```text
//! POST /api/v1/login {"username":"admin","password":"secret"}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::{
    CurrentActorContext, Error, ErrorCode, LoginCredentials, LoginValidationError, Operation,
    PermissionModel, Role, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<&LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: &LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// The acting user as the presentation layer sees them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorProfile {
    pub id: UserId,
    pub full_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub allowed_operations: &'static [Operation],
}

impl From<&CurrentActorContext> for ActorProfile {
    fn from(actor: &CurrentActorContext) -> Self {
        Self {
            id: actor.user_id(),
            full_name: actor.full_name().as_ref().to_owned(),
            role: actor.role(),
            phone: actor.phone().map(str::to_owned),
            allowed_operations: PermissionModel::allowed_operations(actor.role()),
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Resolve the session cookie into a fresh actor context.
///
/// Stale sessions (the user was deleted) are purged so the client is sent
/// back to the login screen.
pub(crate) async fn current_actor(
    state: &HttpState,
    session: &SessionContext,
) -> ApiResult<CurrentActorContext> {
    let user_id = session.require_user_id()?;
    match state.auth.resolve_actor(user_id).await {
        Err(error) if error.code() == ErrorCode::Unauthorized => {
            session.clear();
            Err(error)
        }
        other => other,
    }
}

/// Verify credentials and establish a session.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<ActorProfile>> {
    let credentials =
        LoginCredentials::try_from(&payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state
        .auth
        .verify_credentials(&credentials)
        .await?
        .ok_or_else(|| Error::unauthorized("invalid username or password"))?;
    session.persist_user(user.id)?;
    info!(user_id = %user.id, role = %user.role, "user logged in");
    Ok(web::Json(ActorProfile::from(&CurrentActorContext::from(
        &user,
    ))))
}

/// End the session. Succeeds whether or not one existed.
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    if let Some(user_id) = session.user_id() {
        info!(%user_id, "user logged out");
    }
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Profile and capabilities of the logged-in user.
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ActorProfile>> {
    let actor = current_actor(&state, &session).await?;
    Ok(web::Json(ActorProfile::from(&actor)))
}
