//! Project domain service.
//!
//! Implements the project driving ports. Completion resolves the whole team
//! before anything is written, then asks the store to mark the project
//! completed and credit the roster in a single commit.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{error, info};

use crate::domain::points::{self, PointsError};
use crate::domain::ports::{
    ProjectPersistenceError, ProjectRepository, ProjectsCommand, ProjectsQuery,
    UserPersistenceError, UserRepository,
};
use crate::domain::{AlreadyCompleted, Error, NewProject, Project, ProjectId, User, UserId};

/// Project service implementing the project driving ports.
#[derive(Clone)]
pub struct ProjectService<P, U> {
    projects: Arc<P>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<P, U> ProjectService<P, U> {
    pub fn new(projects: Arc<P>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            projects,
            users,
            clock,
        }
    }
}

fn map_project_error(error: ProjectPersistenceError) -> Error {
    match error {
        ProjectPersistenceError::Connection { message } => {
            error!(%message, "project store unreachable");
            Error::service_unavailable("project store unavailable")
        }
        ProjectPersistenceError::Query { message } => {
            error!(%message, "project store query failed");
            Error::internal(format!("project store error: {message}"))
        }
        ProjectPersistenceError::AlreadyCompleted { id } => {
            already_completed(AlreadyCompleted {
                id: ProjectId::new(id),
            })
        }
        ProjectPersistenceError::Missing { id } => project_not_found(ProjectId::new(id)),
        ProjectPersistenceError::MissingMember { id } => member_not_found(UserId::new(id)),
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            error!(%message, "user store unreachable");
            Error::service_unavailable("user store unavailable")
        }
        UserPersistenceError::Query { message }
        | UserPersistenceError::DuplicateUsername { username: message } => {
            error!(%message, "user store query failed");
            Error::internal(format!("user store error: {message}"))
        }
    }
}

fn already_completed(err: AlreadyCompleted) -> Error {
    Error::conflict(err.to_string()).with_details(json!({ "code": "already_completed" }))
}

fn member_not_found(member: UserId) -> Error {
    Error::not_found(format!("team member {member} not found"))
        .with_details(json!({ "memberId": member.get(), "code": "member_not_found" }))
}

fn project_not_found(id: ProjectId) -> Error {
    Error::not_found(format!("project {id} not found"))
}

impl<P, U> ProjectService<P, U>
where
    P: ProjectRepository,
    U: UserRepository,
{
    async fn load(&self, id: ProjectId) -> Result<Project, Error> {
        self.projects
            .find_by_id(id)
            .await
            .map_err(map_project_error)?
            .ok_or_else(|| project_not_found(id))
    }

    /// Fetch every roster member in order, failing on the first unknown id.
    async fn resolve_team(&self, project: &Project) -> Result<Vec<User>, Error> {
        let mut members = Vec::with_capacity(project.team_members().len());
        for &member in project.team_members() {
            let user = self
                .users
                .find_by_id(member)
                .await
                .map_err(map_user_error)?
                .ok_or_else(|| member_not_found(member))?;
            members.push(user);
        }
        Ok(members)
    }
}

#[async_trait]
impl<P, U> ProjectsQuery for ProjectService<P, U>
where
    P: ProjectRepository,
    U: UserRepository,
{
    async fn list_projects(&self) -> Result<Vec<Project>, Error> {
        self.projects.list().await.map_err(map_project_error)
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, Error> {
        self.load(id).await
    }
}

#[async_trait]
impl<P, U> ProjectsCommand for ProjectService<P, U>
where
    P: ProjectRepository,
    U: UserRepository,
{
    async fn create_project(&self, draft: NewProject) -> Result<Project, Error> {
        let project = self
            .projects
            .insert(draft, self.clock.utc())
            .await
            .map_err(map_project_error)?;
        info!(project_id = %project.id(), "project created");
        Ok(project)
    }

    async fn update_progress(&self, id: ProjectId, progress: i32) -> Result<Project, Error> {
        self.load(id)
            .await?
            .with_progress(progress)
            .map_err(already_completed)?;
        // The store re-checks the status; a completion may land in between.
        self.projects
            .save_progress(id, progress)
            .await
            .map_err(map_project_error)
    }

    async fn complete_project(&self, id: ProjectId) -> Result<Project, Error> {
        let completed = self.load(id).await?.completed().map_err(already_completed)?;
        let team = self.resolve_team(&completed).await?;
        // Dry run against the balances just read; the store re-applies the
        // credit to its own values when committing.
        let credited = points::distribute(&completed, &team).map_err(|err| match err {
            PointsError::MissingMember { member } => member_not_found(member),
            PointsError::Overflow { .. } => Error::internal(err.to_string()),
        })?;
        self.projects
            .commit_completion(&completed)
            .await
            .map_err(map_project_error)?;
        info!(
            project_id = %id,
            reward = completed.reward_points(),
            credited = credited.len(),
            "project completed"
        );
        Ok(completed)
    }
}

#[cfg(test)]
#[path = "project_service_tests.rs"]
mod tests;
