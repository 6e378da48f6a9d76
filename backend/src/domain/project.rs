//! Project data model.
//!
//! A project is a unit of tracked work owned by a team. It starts `active`,
//! moves its progress freely, and can be completed exactly once; completion is
//! what pays the team its reward points (see [`super::points`]).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::UserId;

/// Longest accepted project title, in characters.
pub const TITLE_MAX: usize = 120;
/// Progress value a completed project always reports.
pub const COMPLETE_PROGRESS: i32 = 100;

/// Numeric project identifier allocated by the storage adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(u64);

impl ProjectId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed set of project categories shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Web Dev")]
    WebDev,
    #[serde(rename = "Hacking")]
    Hacking,
    #[serde(rename = "Automation")]
    Automation,
    #[serde(rename = "Robotics")]
    Robotics,
    #[serde(rename = "App Dev")]
    AppDev,
    #[serde(rename = "Reverse Engineering")]
    ReverseEngineering,
    #[serde(rename = "AI/ML")]
    AiMl,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Self; 7] = [
        Self::WebDev,
        Self::Hacking,
        Self::Automation,
        Self::Robotics,
        Self::AppDev,
        Self::ReverseEngineering,
        Self::AiMl,
    ];

    /// Label used on the wire and in storage.
    pub const fn label(self) -> &'static str {
        match self {
            Self::WebDev => "Web Dev",
            Self::Hacking => "Hacking",
            Self::Automation => "Automation",
            Self::Robotics => "Robotics",
            Self::AppDev => "App Dev",
            Self::ReverseEngineering => "Reverse Engineering",
            Self::AiMl => "AI/ML",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ProjectValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == raw)
            .ok_or_else(|| ProjectValidationError::UnknownCategory {
                value: raw.to_owned(),
            })
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
}

/// Validation failures for project input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("unknown category: {value}")]
    UnknownCategory { value: String },
    #[error("rewardPoints must not be negative")]
    NegativeReward,
}

impl ProjectValidationError {
    /// Request field the failure refers to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::UnknownCategory { .. } => "category",
            Self::NegativeReward => "rewardPoints",
        }
    }
}

/// Transition refused because the project is already completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("project {id} is already completed")]
pub struct AlreadyCompleted {
    pub id: ProjectId,
}

/// Validated input for a new project.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    title: String,
    description: String,
    category: Category,
    reward_points: u64,
    team_members: Vec<UserId>,
    team_leader_id: UserId,
    tasks: Vec<Value>,
}

impl NewProject {
    /// Validate raw project input.
    ///
    /// Team members are deduplicated keeping the first occurrence of each id.
    ///
    /// # Examples
    /// ```
    /// use teamboard::domain::{NewProject, UserId};
    ///
    /// let draft = NewProject::try_from_parts(
    ///     "Scanner",
    ///     "",
    ///     "Hacking",
    ///     50,
    ///     vec![UserId::new(2), UserId::new(1), UserId::new(2)],
    ///     UserId::new(1),
    ///     Vec::new(),
    /// )
    /// .unwrap();
    /// assert_eq!(draft.team_members(), &[UserId::new(2), UserId::new(1)]);
    /// ```
    pub fn try_from_parts(
        title: &str,
        description: &str,
        category: &str,
        reward_points: i64,
        team_members: Vec<UserId>,
        team_leader_id: UserId,
        tasks: Vec<Value>,
    ) -> Result<Self, ProjectValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ProjectValidationError::EmptyTitle);
        }
        if title.chars().count() > TITLE_MAX {
            return Err(ProjectValidationError::TitleTooLong { max: TITLE_MAX });
        }
        let category = category.parse()?;
        let reward_points =
            u64::try_from(reward_points).map_err(|_| ProjectValidationError::NegativeReward)?;
        Ok(Self {
            title: title.to_owned(),
            description: description.to_owned(),
            category,
            reward_points,
            team_members: dedup_members(team_members),
            team_leader_id,
            tasks,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn team_members(&self) -> &[UserId] {
        &self.team_members
    }

    pub fn reward_points(&self) -> u64 {
        self.reward_points
    }
}

fn dedup_members(members: Vec<UserId>) -> Vec<UserId> {
    let mut unique = Vec::with_capacity(members.len());
    for member in members {
        if !unique.contains(&member) {
            unique.push(member);
        }
    }
    unique
}

/// Field-by-field view of a stored project, used by adapters to rebuild one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectParts {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub status: ProjectStatus,
    pub reward_points: u64,
    pub team_members: Vec<UserId>,
    pub team_leader_id: UserId,
    pub progress: i32,
    pub tasks: Vec<Value>,
    pub created_at: DateTime<Utc>,
}

/// Tracked project.
///
/// ## Invariants
/// - `status == Completed` implies `progress == 100`.
/// - `team_members` holds no duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    id: ProjectId,
    title: String,
    description: String,
    category: Category,
    status: ProjectStatus,
    reward_points: u64,
    team_members: Vec<UserId>,
    team_leader_id: UserId,
    progress: i32,
    tasks: Vec<Value>,
    created_at: DateTime<Utc>,
}

impl Project {
    /// Fresh active project with zero progress.
    pub fn create(id: ProjectId, draft: NewProject, created_at: DateTime<Utc>) -> Self {
        let NewProject {
            title,
            description,
            category,
            reward_points,
            team_members,
            team_leader_id,
            tasks,
        } = draft;
        Self {
            id,
            title,
            description,
            category,
            status: ProjectStatus::Active,
            reward_points,
            team_members,
            team_leader_id,
            progress: 0,
            tasks,
            created_at,
        }
    }

    /// Rebuild a stored project, repairing the invariants if the record broke them.
    pub fn restore(parts: ProjectParts) -> Self {
        let progress = match parts.status {
            ProjectStatus::Completed => COMPLETE_PROGRESS,
            ProjectStatus::Active => parts.progress,
        };
        Self {
            id: parts.id,
            title: parts.title,
            description: parts.description,
            category: parts.category,
            status: parts.status,
            reward_points: parts.reward_points,
            team_members: dedup_members(parts.team_members),
            team_leader_id: parts.team_leader_id,
            progress,
            tasks: parts.tasks,
            created_at: parts.created_at,
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProjectStatus::Completed
    }

    pub fn reward_points(&self) -> u64 {
        self.reward_points
    }

    pub fn team_members(&self) -> &[UserId] {
        &self.team_members
    }

    pub fn team_leader_id(&self) -> UserId {
        self.team_leader_id
    }

    pub fn progress(&self) -> i32 {
        self.progress
    }

    pub fn tasks(&self) -> &[Value] {
        &self.tasks
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Copy with `progress` overwritten. Any value is accepted while active.
    pub fn with_progress(&self, progress: i32) -> Result<Self, AlreadyCompleted> {
        self.ensure_active()?;
        Ok(Self {
            progress,
            ..self.clone()
        })
    }

    /// Completed copy of an active project.
    pub fn completed(&self) -> Result<Self, AlreadyCompleted> {
        self.ensure_active()?;
        Ok(Self {
            status: ProjectStatus::Completed,
            progress: COMPLETE_PROGRESS,
            ..self.clone()
        })
    }

    fn ensure_active(&self) -> Result<(), AlreadyCompleted> {
        if self.is_completed() {
            Err(AlreadyCompleted { id: self.id })
        } else {
            Ok(())
        }
    }
}
