//! Admin API handlers.
//!
//! ```text
//! POST /api/admin/login {"password":"..."}
//! POST /api/admin/users {"username":"grace","password":"...","name":"Grace Hopper"}
//! ```
//!
//! The admin secret unlocks a single `admin` identity. Once logged in, that
//! identity may create ordinary users.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::{Error, NewUser, UserValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::session_user;
use crate::inbound::http::dto::UserResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/admin/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
pub struct AdminLoginRequest {
    pub password: String,
}

/// Body of `POST /api/admin/users`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = UserValidationError;

    fn try_from(value: CreateUserRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.username,
            &value.password,
            &value.name,
            value.avatar,
            value.skills,
        )
    }
}

fn map_user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = match err {
        UserValidationError::EmptyUsername => ("username", "empty_username"),
        UserValidationError::UsernameTooLong { .. } => ("username", "too_long"),
        UserValidationError::EmptyPassword => ("password", "empty_password"),
        UserValidationError::EmptyDisplayName => ("name", "empty_name"),
        UserValidationError::DisplayNameTooLong { .. } => ("name", "too_long"),
        UserValidationError::EmptySkill => ("skills", "empty_skill"),
        UserValidationError::SkillTooLong { .. } => ("skills", "too_long"),
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field, "code": code }))
}

/// Exchange the admin secret for an admin session.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Admin session established", body = UserResponse, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Wrong or unconfigured secret", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/admin/login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AdminLoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let admin = state.login.admin_login(&payload.password).await?;
    session.persist_user(admin.id())?;
    info!(user_id = %admin.id(), "admin logged in");
    Ok(web::Json(UserResponse::from(admin)))
}

/// Create an ordinary user. Requires an admin session.
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Not logged in", body = ErrorSchema),
        (status = 403, description = "Not an admin", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "createUser"
)]
#[post("/admin/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    // Role check precedes body validation.
    let actor = session_user(&state, &session).await?;
    if !actor.role().is_admin() {
        return Err(Error::forbidden("admin access required"));
    }
    let new_user = NewUser::try_from(payload.into_inner()).map_err(map_user_validation_error)?;
    let user = state.user_admin.create_user(actor.id(), new_user).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
