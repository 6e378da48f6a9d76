//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing store, so handler tests can substitute a mock.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    ///
    /// Unknown usernames and wrong passwords fail with the same
    /// `unauthorized` error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;

    /// Check the admin shared secret and return the admin identity, creating
    /// it on first use.
    async fn admin_login(&self, password: &str) -> Result<User, Error>;
}
