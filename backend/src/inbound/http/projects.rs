//! Projects API handlers.
//!
//! ```text
//! GET   /api/projects
//! GET   /api/projects/{id}
//! POST  /api/projects            {"title":"...","category":"Robotics",...}
//! PATCH /api/projects/{id}/progress {"progress":40}
//! POST  /api/projects/{id}/complete
//! ```
//!
//! Reads are public; every mutation needs a logged-in session.

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::domain::{Error, NewProject, ProjectId, ProjectValidationError, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::session_user;
use crate::inbound::http::dto::ProjectResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ID_FIELD, parse_id};

/// Body of `POST /api/projects`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[schema(example = "Robotics")]
    pub category: String,
    #[serde(default)]
    pub reward_points: i64,
    #[serde(default)]
    pub team_members: Vec<u64>,
    pub team_leader_id: u64,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub tasks: Vec<Value>,
}

impl TryFrom<CreateProjectRequest> for NewProject {
    type Error = ProjectValidationError;

    fn try_from(value: CreateProjectRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.title,
            &value.description,
            &value.category,
            value.reward_points,
            value.team_members.into_iter().map(UserId::new).collect(),
            UserId::new(value.team_leader_id),
            value.tasks,
        )
    }
}

/// Body of `PATCH /api/projects/{id}/progress`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProgressRequest {
    /// New progress value, stored as given.
    #[schema(example = 40)]
    pub progress: i32,
}

fn map_project_validation_error(err: ProjectValidationError) -> Error {
    let code = match err {
        ProjectValidationError::EmptyTitle => "empty_title",
        ProjectValidationError::TitleTooLong { .. } => "too_long",
        ProjectValidationError::UnknownCategory { .. } => "unknown_category",
        ProjectValidationError::NegativeReward => "negative_reward",
    };
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": code }))
}

fn project_id(raw: &str) -> Result<ProjectId, Error> {
    parse_id(raw, ID_FIELD).map(ProjectId::new)
}

/// List every project in ascending id order.
#[utoipa::path(
    get,
    path = "/api/projects",
    responses(
        (status = 200, description = "Projects", body = [ProjectResponse]),
        (status = 503, description = "Project store unavailable", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "listProjects",
    security([])
)]
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ProjectResponse>>> {
    let projects = state.projects_query.list_projects().await?;
    Ok(web::Json(
        projects.into_iter().map(ProjectResponse::from).collect(),
    ))
}

/// Fetch a single project.
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = u64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "Unknown project", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "getProject",
    security([])
)]
#[get("/projects/{id}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let id = project_id(&path)?;
    let project = state.projects_query.get_project(id).await?;
    Ok(web::Json(ProjectResponse::from(project)))
}

/// Create an active project with zero progress.
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Not logged in", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/projects")]
pub async fn create_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateProjectRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session_user(&state, &session).await?;
    let draft = NewProject::try_from(payload.into_inner()).map_err(map_project_validation_error)?;
    let project = state.projects.create_project(draft).await?;
    info!(project_id = %project.id(), created_by = %actor.id(), "project submitted");
    Ok(HttpResponse::Created().json(ProjectResponse::from(project)))
}

/// Overwrite the progress of an active project.
#[utoipa::path(
    patch,
    path = "/api/projects/{id}/progress",
    params(("id" = u64, Path, description = "Project id")),
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Not logged in", body = ErrorSchema),
        (status = 404, description = "Unknown project", body = ErrorSchema),
        (status = 409, description = "Project already completed", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "updateProgress"
)]
#[patch("/projects/{id}/progress")]
pub async fn update_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProgressRequest>,
) -> ApiResult<web::Json<ProjectResponse>> {
    session_user(&state, &session).await?;
    let id = project_id(&path)?;
    let project = state.projects.update_progress(id, payload.progress).await?;
    Ok(web::Json(ProjectResponse::from(project)))
}

/// Complete a project and credit every team member its reward.
#[utoipa::path(
    post,
    path = "/api/projects/{id}/complete",
    params(("id" = u64, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project completed", body = ProjectResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Not logged in", body = ErrorSchema),
        (status = 404, description = "Unknown project or team member", body = ErrorSchema),
        (status = 409, description = "Project already completed", body = ErrorSchema)
    ),
    tags = ["projects"],
    operation_id = "completeProject"
)]
#[post("/projects/{id}/complete")]
pub async fn complete_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProjectResponse>> {
    let actor = session_user(&state, &session).await?;
    let id = project_id(&path)?;
    let project = state.projects.complete_project(id).await?;
    info!(project_id = %id, completed_by = %actor.id(), "project completion requested");
    Ok(web::Json(ProjectResponse::from(project)))
}

#[cfg(test)]
#[path = "projects_tests.rs"]
mod tests;
