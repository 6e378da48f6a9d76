//! Driving port for user-facing queries.

use async_trait::async_trait;

use crate::domain::{Error, User, UserId};

/// Default leaderboard size.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 5;
/// Largest leaderboard a client may request.
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Resolve a session identity; `None` when the user no longer exists.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, Error>;

    /// Every user in ascending id order.
    async fn list_users(&self) -> Result<Vec<User>, Error>;

    /// Users listing `skill`, matched without regard to ASCII case.
    async fn users_with_skill(&self, skill: &str) -> Result<Vec<User>, Error>;

    /// Top `limit` users by points, ties broken by username.
    async fn leaderboard(&self, limit: usize) -> Result<Vec<User>, Error>;
}
