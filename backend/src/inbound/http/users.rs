//! User administration handlers.
//!
//! ```text
//! GET    /api/v1/users
//! POST   /api/v1/users {"username":"tech3","password":"...","role":"technician","fullName":"..."}
//! PUT    /api/v1/users/{id} {"role":"manager","fullName":"...","newPassword":null}
//! DELETE /api/v1/users/{id}
//! GET    /api/v1/technicians
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::{Role, User, UserDraft, UserId, UserProfileDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_actor;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<CreateUserBody> for UserDraft {
    fn from(body: CreateUserBody) -> Self {
        Self {
            username: body.username,
            password: Zeroizing::new(body.password),
            role: body.role,
            full_name: body.full_name,
            phone: body.phone,
        }
    }
}

/// Profile edit; a blank or missing `newPassword` keeps the current one.
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub role: Role,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

impl From<UpdateUserBody> for UserProfileDraft {
    fn from(body: UpdateUserBody) -> Self {
        Self {
            role: body.role,
            full_name: body.full_name,
            phone: body.phone,
            new_password: body.new_password.map(Zeroizing::new),
        }
    }
}

/// Everyone, administrators first then by full name.
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let actor = current_actor(&state, &session).await?;
    Ok(web::Json(state.users.list_users(&actor).await?))
}

#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserBody>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    let user = state
        .users
        .create_user(&actor, UserDraft::from(payload.into_inner()))
        .await?;
    Ok(HttpResponse::Created().json(user))
}

#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
    payload: web::Json<UpdateUserBody>,
) -> ApiResult<web::Json<User>> {
    let actor = current_actor(&state, &session).await?;
    let user = state
        .users
        .update_user(
            &actor,
            UserId::new(path.into_inner()),
            UserProfileDraft::from(payload.into_inner()),
        )
        .await?;
    Ok(web::Json(user))
}

/// Remove a user together with their comments and history entries.
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let actor = current_actor(&state, &session).await?;
    state
        .users
        .delete_user(&actor, UserId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/technicians")]
pub async fn list_technicians(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let actor = current_actor(&state, &session).await?;
    Ok(web::Json(state.users.list_technicians(&actor).await?))
}
