//! Response bodies shared by the HTTP handlers.
//!
//! Users are rendered without their password hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{Category, Project, ProjectStatus, Role, User};

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(value_type = String, example = "user")]
    pub role: Role,
    pub avatar: Option<String>,
    #[schema(example = 250)]
    pub points: u64,
    pub skills: Vec<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().get(),
            username: user.username().to_string(),
            name: user.name().as_ref().to_owned(),
            role: user.role(),
            avatar: user.avatar().map(str::to_owned),
            points: user.points(),
            skills: user.skills().to_vec(),
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

/// Project record as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = "Line follower")]
    pub title: String,
    pub description: String,
    #[schema(value_type = String, example = "Robotics")]
    pub category: Category,
    #[schema(value_type = String, example = "active")]
    pub status: ProjectStatus,
    #[schema(example = 100)]
    pub reward_points: u64,
    pub team_members: Vec<u64>,
    pub team_leader_id: u64,
    #[schema(example = 40)]
    pub progress: i32,
    #[schema(value_type = Vec<Object>)]
    pub tasks: Vec<Value>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<&Project> for ProjectResponse {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id().get(),
            title: project.title().to_owned(),
            description: project.description().to_owned(),
            category: project.category(),
            status: project.status(),
            reward_points: project.reward_points(),
            team_members: project.team_members().iter().map(|id| id.get()).collect(),
            team_leader_id: project.team_leader_id().get(),
            progress: project.progress(),
            tasks: project.tasks().to_vec(),
            created_at: project.created_at(),
        }
    }
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self::from(&project)
    }
}
