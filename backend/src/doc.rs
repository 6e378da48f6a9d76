//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every inbound HTTP path together with the request
//! and response schemas and the session cookie security scheme. Swagger UI
//! serves it in debug builds and `openapi-dump` prints it for tooling.

use crate::inbound::http::admin::{AdminLoginRequest, CreateUserRequest};
use crate::inbound::http::dto::{ProjectResponse, UserResponse};
use crate::inbound::http::projects::{CreateProjectRequest, ProgressRequest};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::LoginRequest;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login or POST /api/admin/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Teamboard API",
        description = "Team projects, progress tracking and reward points."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::users_with_skill,
        crate::inbound::http::users::leaderboard,
        crate::inbound::http::admin::admin_login,
        crate::inbound::http::admin::create_user,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::update_progress,
        crate::inbound::http::projects::complete_project,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserResponse,
        ProjectResponse,
        LoginRequest,
        AdminLoginRequest,
        CreateUserRequest,
        CreateProjectRequest,
        ProgressRequest,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "users", description = "Login, sessions and user listings"),
        (name = "admin", description = "Admin login and user management"),
        (name = "projects", description = "Projects, progress and completion"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
