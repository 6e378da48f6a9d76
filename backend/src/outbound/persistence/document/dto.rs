//! Stored document shapes for the remote document store.
//!
//! Field names match the records the dashboard has always written
//! (`password` holds the encoded hash, camelCase elsewhere), so existing
//! namespaces load unchanged. Older scrypt hashes keep verifying; see
//! [`crate::domain::PasswordHasher::verify`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    Category, DisplayName, PasswordHash, Project, ProjectId, ProjectParts, ProjectStatus, Role,
    User, UserId, Username,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserDocument {
    pub(super) id: u64,
    pub(super) username: String,
    pub(super) password: String,
    pub(super) name: String,
    #[serde(default = "legacy_role")]
    pub(super) role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) avatar: Option<String>,
    #[serde(default)]
    pub(super) points: u64,
    #[serde(default)]
    pub(super) skills: Vec<String>,
}

fn legacy_role() -> Role {
    Role::Member
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().get(),
            username: user.username().to_string(),
            password: user.password_hash().to_string(),
            name: user.name().as_ref().to_owned(),
            role: user.role(),
            avatar: user.avatar().map(str::to_owned),
            points: user.points(),
            skills: user.skills().to_vec(),
        }
    }
}

impl UserDocument {
    pub(super) fn into_domain(self) -> Result<User, String> {
        let id = self.id;
        let username =
            Username::new(&self.username).map_err(|err| format!("user {id}: {err}"))?;
        let password_hash: PasswordHash = self
            .password
            .parse()
            .map_err(|err| format!("user {id}: {err}"))?;
        let name = DisplayName::new(&self.name).map_err(|err| format!("user {id}: {err}"))?;
        Ok(
            User::builder(UserId::new(id), username, password_hash, name)
                .role(self.role)
                .avatar(self.avatar)
                .points(self.points)
                .skills(self.skills)
                .build(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProjectDocument {
    pub(super) id: u64,
    pub(super) title: String,
    #[serde(default)]
    pub(super) description: String,
    pub(super) category: Category,
    #[serde(default = "active_status")]
    pub(super) status: ProjectStatus,
    #[serde(default)]
    pub(super) reward_points: u64,
    #[serde(default)]
    pub(super) team_members: Vec<u64>,
    pub(super) team_leader_id: u64,
    #[serde(default)]
    pub(super) progress: i32,
    #[serde(default)]
    pub(super) tasks: Vec<Value>,
    pub(super) created_at: DateTime<Utc>,
}

fn active_status() -> ProjectStatus {
    ProjectStatus::Active
}

impl From<&Project> for ProjectDocument {
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

impl ProjectDocument {
    pub(super) fn into_domain(self) -> Project {
        Project::restore(ProjectParts {
            id: ProjectId::new(self.id),
            title: self.title,
            description: self.description,
            category: self.category,
            status: self.status,
            reward_points: self.reward_points,
            team_members: self.team_members.into_iter().map(UserId::new).collect(),
            team_leader_id: UserId::new(self.team_leader_id),
            progress: self.progress,
            tasks: self.tasks,
            created_at: self.created_at,
        })
    }
}

/// Decode a collection node into documents keyed by numeric id.
///
/// A missing collection reads back as `null`. Collections whose keys are
/// small consecutive integers may come back as a JSON array with `null`
/// holes, so both shapes are accepted. Keys that are not integers are
/// rejected.
pub(super) fn decode_collection<T: DeserializeOwned>(
    node: Value,
) -> Result<BTreeMap<u64, T>, String> {
    let entries: Vec<(u64, Value)> = match node {
        Value::Null => Vec::new(),
        Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| {
                key.parse::<u64>()
                    .map(|id| (id, value))
                    .map_err(|_| format!("document key {key:?} is not a numeric id"))
            })
            .collect::<Result<_, _>>()?,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index as u64, value))
            .collect(),
        other => return Err(format!("expected a collection, found {other}")),
    };

    entries
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(id, value)| {
            serde_json::from_value(value)
                .map(|document| (id, document))
                .map_err(|err| format!("document {id}: {err}"))
        })
        .collect()
}
