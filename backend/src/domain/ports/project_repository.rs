//! Port abstraction for project persistence, including the completion commit.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewProject, Project, ProjectId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by project repository adapters.
    pub enum ProjectPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "project repository query failed: {message}",
        /// The stored project was already completed when the commit ran.
        AlreadyCompleted { id: u64 } => "project {id} is already completed",
        /// No project is stored under the identifier.
        Missing { id: u64 } => "project {id} does not exist",
        /// A team member credited by the commit has no stored record.
        MissingMember { id: u64 } => "team member {id} does not exist",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Fetch a project by identifier.
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, ProjectPersistenceError>;

    /// All projects in ascending id order.
    async fn list(&self) -> Result<Vec<Project>, ProjectPersistenceError>;

    /// Allocate an id and store a fresh project built from `draft`.
    async fn insert(
        &self,
        draft: NewProject,
        created_at: DateTime<Utc>,
    ) -> Result<Project, ProjectPersistenceError>;

    /// Set the progress of a stored project and return the updated record.
    ///
    /// The status check and the write happen against the same stored copy:
    /// adapters refuse with [`ProjectPersistenceError::AlreadyCompleted`]
    /// when the project is completed at write time, so a progress update
    /// can never revert a completion.
    async fn save_progress(
        &self,
        id: ProjectId,
        progress: i32,
    ) -> Result<Project, ProjectPersistenceError>;

    /// Persist a completed project and credit every team member with its
    /// reward points, as one write.
    ///
    /// Balances are credited relative to the stored values at commit time.
    /// Adapters must refuse with [`ProjectPersistenceError::AlreadyCompleted`]
    /// when the stored copy is already completed and with
    /// [`ProjectPersistenceError::MissingMember`] when a member is unknown,
    /// writing nothing in either case.
    async fn commit_completion(&self, project: &Project) -> Result<(), ProjectPersistenceError>;
}
