//! Driving port for reading projects.

use async_trait::async_trait;

use crate::domain::{Error, Project, ProjectId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectsQuery: Send + Sync {
    /// Every project in ascending id order.
    async fn list_projects(&self) -> Result<Vec<Project>, Error>;

    /// A single project; `not_found` when unknown.
    async fn get_project(&self, id: ProjectId) -> Result<Project, Error>;
}
