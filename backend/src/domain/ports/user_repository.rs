//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{User, UserDraft, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another record already owns the username.
        DuplicateUsername { username: String } => "username {username} is already taken",
    }
}

/// Credential store for user records.
///
/// Adapters own id allocation: [`UserRepository::insert`] assigns an id no
/// other record holds.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by exact username.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<User>, UserPersistenceError>;

    /// All users in ascending id order.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Store a new user under a freshly allocated id.
    ///
    /// Fails with [`UserPersistenceError::DuplicateUsername`] when the
    /// username is already present.
    async fn insert(&self, draft: UserDraft) -> Result<User, UserPersistenceError>;
}
