//! Driving port for project mutations.

use async_trait::async_trait;

use crate::domain::{Error, NewProject, Project, ProjectId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectsCommand: Send + Sync {
    /// Create an active project stamped with the current time.
    async fn create_project(&self, draft: NewProject) -> Result<Project, Error>;

    /// Overwrite the progress of an active project.
    async fn update_progress(&self, id: ProjectId, progress: i32) -> Result<Project, Error>;

    /// Complete an active project and credit its team.
    ///
    /// Fails with `conflict` when the project is already completed and with
    /// `not_found` when the project or one of its members is unknown; nothing
    /// is credited on failure.
    async fn complete_project(&self, id: ProjectId) -> Result<Project, Error>;
}
