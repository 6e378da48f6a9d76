//! Driving port for admin-only user management.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdminCommand: Send + Sync {
    /// Create an ordinary user on behalf of `actor`.
    ///
    /// `actor` must resolve to an admin (`forbidden` otherwise, `unauthorized`
    /// when it no longer exists). The new account always gets the `user`
    /// role and a zero balance.
    async fn create_user(&self, actor: UserId, new_user: NewUser) -> Result<User, Error>;
}
