//! In-memory persistence adapter.
//!
//! Backs both repository ports with one lock so the completion commit is
//! atomic: the project status is re-checked and balances are credited from
//! the stored values while the write guard is held. Progress writes check the
//! status under the same guard. Used when no remote
//! store is configured and by the integration tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{
    ProjectPersistenceError, ProjectRepository, UserPersistenceError, UserRepository,
};
use crate::domain::points::{self, PointsError};
use crate::domain::{NewProject, Project, ProjectId, User, UserDraft, UserId};

#[derive(Debug, Default)]
struct Records {
    users: BTreeMap<UserId, User>,
    projects: BTreeMap<ProjectId, Project>,
    last_user_id: u64,
    last_project_id: u64,
}

/// Shared in-memory store; clones see the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<Records>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.records.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .records
            .read()
            .await
            .users
            .values()
            .find(|user| user.username().as_ref() == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.records.read().await.users.values().cloned().collect())
    }

    async fn insert(&self, draft: UserDraft) -> Result<User, UserPersistenceError> {
        let mut records = self.records.write().await;
        if records
            .users
            .values()
            .any(|user| user.username() == &draft.username)
        {
            return Err(UserPersistenceError::duplicate_username(
                draft.username.to_string(),
            ));
        }
        let next = records
            .last_user_id
            .checked_add(1)
            .ok_or_else(|| UserPersistenceError::query("user id space exhausted"))?;
        records.last_user_id = next;
        let user = draft.into_user(UserId::new(next));
        records.users.insert(user.id(), user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ProjectRepository for InMemoryStore {
    async fn find_by_id(&self, id: ProjectId) -> Result<Option<Project>, ProjectPersistenceError> {
        Ok(self.records.read().await.projects.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Project>, ProjectPersistenceError> {
        Ok(self.records.read().await.projects.values().cloned().collect())
    }

    async fn insert(
        &self,
        draft: NewProject,
        created_at: DateTime<Utc>,
    ) -> Result<Project, ProjectPersistenceError> {
        let mut records = self.records.write().await;
        let next = records
            .last_project_id
            .checked_add(1)
            .ok_or_else(|| ProjectPersistenceError::query("project id space exhausted"))?;
        records.last_project_id = next;
        let project = Project::create(ProjectId::new(next), draft, created_at);
        records.projects.insert(project.id(), project.clone());
        Ok(project)
    }

    async fn save_progress(
        &self,
        id: ProjectId,
        progress: i32,
    ) -> Result<Project, ProjectPersistenceError> {
        let mut records = self.records.write().await;
        let stored = records
            .projects
            .get_mut(&id)
            .ok_or_else(|| ProjectPersistenceError::missing(id.get()))?;
        let updated = stored
            .with_progress(progress)
            .map_err(|_| ProjectPersistenceError::already_completed(id.get()))?;
        *stored = updated.clone();
        Ok(updated)
    }

    async fn commit_completion(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        let mut records = self.records.write().await;
        let Some(stored) = records.projects.get(&project.id()) else {
            return Err(ProjectPersistenceError::missing(project.id().get()));
        };
        if stored.is_completed() {
            return Err(ProjectPersistenceError::already_completed(project.id().get()));
        }
        let team = project
            .team_members()
            .iter()
            .map(|id| {
                records
                    .users
                    .get(id)
                    .cloned()
                    .ok_or_else(|| ProjectPersistenceError::missing_member(id.get()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let credited = points::distribute(project, &team).map_err(|err| match err {
            PointsError::MissingMember { member } => {
                ProjectPersistenceError::missing_member(member.get())
            }
            PointsError::Overflow { .. } => ProjectPersistenceError::query(err.to_string()),
        })?;
        records.projects.insert(project.id(), project.clone());
        for user in credited {
            records.users.insert(user.id(), user);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
