//! Reward point distribution for completed projects.
//!
//! Pure computation: callers resolve the roster first, this module works out
//! the credited balances, and the store commits them together with the
//! project status change.

use super::{Project, User, UserId};

/// Reasons a distribution cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointsError {
    /// A roster id had no matching resolved user.
    #[error("team member {member} was not resolved")]
    MissingMember { member: UserId },
    /// Crediting would overflow the member's balance.
    #[error("crediting team member {member} would overflow their points balance")]
    Overflow { member: UserId },
}

/// Credit every team member of `project` with its reward points.
///
/// `members` must hold the resolved users for the roster; each roster id is
/// credited exactly once, in roster order, and users outside the roster are
/// ignored.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use teamboard::domain::points::distribute;
/// use teamboard::domain::{
///     DisplayName, NewProject, PasswordHash, Project, ProjectId, User, UserId, Username,
/// };
///
/// let hash: PasswordHash = "aa.bb".parse().unwrap();
/// let ada = User::builder(
///     UserId::new(1),
///     Username::new("ada").unwrap(),
///     hash,
///     DisplayName::new("Ada").unwrap(),
/// )
/// .build();
/// let draft = NewProject::try_from_parts(
///     "Bot", "", "Robotics", 25, vec![UserId::new(1)], UserId::new(1), Vec::new(),
/// )
/// .unwrap();
/// let project = Project::create(ProjectId::new(1), draft, Utc::now());
/// let credited = distribute(&project, &[ada]).unwrap();
/// assert_eq!(credited[0].points(), 25);
/// ```
pub fn distribute(project: &Project, members: &[User]) -> Result<Vec<User>, PointsError> {
    let reward = project.reward_points();
    project
        .team_members()
        .iter()
        .map(|&member| {
            let user = members
                .iter()
                .find(|user| user.id() == member)
                .ok_or(PointsError::MissingMember { member })?;
            user.credited(reward)
                .ok_or(PointsError::Overflow { member })
        })
        .collect()
}
