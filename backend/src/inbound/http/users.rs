//! Users API handlers.
//!
//! ```text
//! POST /api/login {"username":"ada","password":"..."}
//! POST /api/logout
//! GET  /api/user
//! GET  /api/users
//! GET  /api/users/skill/{skill}
//! GET  /api/leaderboard?limit=5
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::ports::DEFAULT_LEADERBOARD_LIMIT;
use crate::domain::{Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::session_user;
use crate::inbound::http::cache_control::session_bound;
use crate::inbound::http::dto::UserResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/login`.
///
/// Example JSON:
/// `{"username":"ada","password":"correct horse"}`
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Query string for `GET /api/leaderboard`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Number of users to return, 1 to 100.
    pub limit: Option<usize>,
}

fn users_response(users: Vec<crate::domain::User>) -> web::Json<Vec<UserResponse>> {
    web::Json(users.into_iter().map(UserResponse::from).collect())
}

/// Authenticate a user and bind the session to them.
///
/// Unknown usernames and wrong passwords produce the same response.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse, headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(user.id())?;
    info!(user_id = %user.id(), "user logged in");
    Ok(web::Json(UserResponse::from(user)))
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// End the current session. Succeeds whether or not one existed.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses((status = 200, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::Ok().finish()
}

/// Return the user bound to the current session.
#[utoipa::path(
    get,
    path = "/api/user",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not logged in", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session_user(&state, &session).await?;
    Ok(HttpResponse::Ok()
        .insert_header(session_bound())
        .json(UserResponse::from(user)))
}

/// List every user.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use teamboard::inbound::http::users::list_users;
///
/// let app = App::new().service(list_users);
/// ```
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserResponse>>> {
    Ok(users_response(state.users.list_users().await?))
}

/// List users having `skill`, ignoring ASCII case.
#[utoipa::path(
    get,
    path = "/api/users/skill/{skill}",
    params(("skill" = String, Path, description = "Skill name")),
    responses(
        (status = 200, description = "Users with the skill", body = [UserResponse]),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "usersWithSkill",
    security([])
)]
#[get("/users/skill/{skill}")]
pub async fn users_with_skill(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let skill = path.into_inner();
    Ok(users_response(state.users.users_with_skill(&skill).await?))
}

/// Users ranked by points, highest first, ties by username.
#[utoipa::path(
    get,
    path = "/api/leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked users", body = [UserResponse]),
        (status = 400, description = "Limit out of range", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "leaderboard",
    security([])
)]
#[get("/leaderboard")]
pub async fn leaderboard(
    state: web::Data<HttpState>,
    query: web::Query<LeaderboardQuery>,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    Ok(users_response(state.users.leaderboard(limit).await?))
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
