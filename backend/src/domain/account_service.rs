//! Account domain service.
//!
//! Implements authentication, the admin gate, user queries and admin-only
//! user creation over a [`UserRepository`]. Argon2 work runs on the blocking
//! pool so request workers stay responsive.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::ports::{
    LoginService, MAX_LEADERBOARD_LIMIT, UserAdminCommand, UserPersistenceError, UserRepository,
    UsersQuery,
};
use crate::domain::{
    AdminSecret, DisplayName, Error, LoginCredentials, NewUser, PasswordHash, PasswordHasher,
    Role, User, UserDraft, UserId, Username,
};

/// Username of the identity unlocked by the admin secret.
pub const ADMIN_USERNAME: &str = "admin";
/// Display name given to the admin identity when it is first created.
pub const ADMIN_DISPLAY_NAME: &str = "Administrator";

const INVALID_CREDENTIALS: &str = "invalid credentials";
const INVALID_ADMIN_PASSWORD: &str = "invalid admin password";

/// Account service implementing the user-facing driving ports.
#[derive(Clone)]
pub struct AccountService<R> {
    users: Arc<R>,
    hasher: Arc<PasswordHasher>,
    admin_secret: Option<AdminSecret>,
}

impl<R> AccountService<R> {
    /// Create a service; `admin_secret = None` disables admin login.
    pub fn new(users: Arc<R>, hasher: Arc<PasswordHasher>, admin_secret: Option<AdminSecret>) -> Self {
        Self {
            users,
            hasher,
            admin_secret,
        }
    }
}

impl<R> AccountService<R>
where
    R: UserRepository,
{
    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                error!(%message, "user store unreachable");
                Error::service_unavailable("user store unavailable")
            }
            UserPersistenceError::Query { message } => {
                error!(%message, "user store query failed");
                Error::internal(format!("user store error: {message}"))
            }
            UserPersistenceError::DuplicateUsername { username } => username_taken(&username),
        }
    }

    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, Error> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = zeroize::Zeroizing::new(plaintext.to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }

    async fn verify(&self, plaintext: &str, stored: &PasswordHash) -> Result<bool, Error> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = zeroize::Zeroizing::new(plaintext.to_owned());
        let stored = stored.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &stored))
            .await
            .map_err(|err| Error::internal(format!("password verification task failed: {err}")))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        self.users
            .find_by_username(username)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn ensure_admin_identity(&self, secret: &AdminSecret) -> Result<User, Error> {
        if let Some(existing) = self.find_by_username(ADMIN_USERNAME).await? {
            return Ok(existing);
        }
        let draft = UserDraft {
            username: Username::new(ADMIN_USERNAME)
                .map_err(|err| Error::internal(format!("invalid admin username: {err}")))?,
            password_hash: self.hash(secret.expose()).await?,
            name: DisplayName::new(ADMIN_DISPLAY_NAME)
                .map_err(|err| Error::internal(format!("invalid admin name: {err}")))?,
            role: Role::Admin,
            avatar: None,
            skills: Vec::new(),
        };
        match self.users.insert(draft).await {
            Ok(user) => {
                info!(user_id = %user.id(), "created admin identity");
                Ok(user)
            }
            // Another request created it first.
            Err(UserPersistenceError::DuplicateUsername { .. }) => self
                .find_by_username(ADMIN_USERNAME)
                .await?
                .ok_or_else(|| Error::internal("admin identity vanished after creation")),
            Err(err) => Err(Self::map_persistence_error(err)),
        }
    }
}

fn username_taken(username: &str) -> Error {
    Error::invalid_request(format!("username {username} is already taken")).with_details(json!({
        "field": "username",
        "code": "username_taken",
    }))
}

#[async_trait]
impl<R> LoginService for AccountService<R>
where
    R: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(user) = self.find_by_username(credentials.username()).await? else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if self.verify(credentials.password(), user.password_hash()).await? {
            Ok(user)
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }

    async fn admin_login(&self, password: &str) -> Result<User, Error> {
        let Some(secret) = self.admin_secret.as_ref() else {
            warn!("admin login attempted but no admin secret is configured");
            return Err(Error::unauthorized(INVALID_ADMIN_PASSWORD));
        };
        if !secret.matches(password) {
            return Err(Error::unauthorized(INVALID_ADMIN_PASSWORD));
        }
        self.ensure_admin_identity(secret).await
    }
}

#[async_trait]
impl<R> UsersQuery for AccountService<R>
where
    R: UserRepository,
{
    async fn find_user(&self, id: UserId) -> Result<Option<User>, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        self.users.list().await.map_err(Self::map_persistence_error)
    }

    async fn users_with_skill(&self, skill: &str) -> Result<Vec<User>, Error> {
        let users = self.list_users().await?;
        Ok(users.into_iter().filter(|user| user.has_skill(skill)).collect())
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<User>, Error> {
        if limit == 0 || limit > MAX_LEADERBOARD_LIMIT {
            return Err(Error::invalid_request(format!(
                "limit must be between 1 and {MAX_LEADERBOARD_LIMIT}"
            ))
            .with_details(json!({ "field": "limit", "code": "out_of_range" })));
        }
        let mut users = self.list_users().await?;
        users.sort_by(|a, b| {
            b.points()
                .cmp(&a.points())
                .then_with(|| a.username().as_ref().cmp(b.username().as_ref()))
        });
        users.truncate(limit);
        Ok(users)
    }
}

#[async_trait]
impl<R> UserAdminCommand for AccountService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, actor: UserId, new_user: NewUser) -> Result<User, Error> {
        let Some(actor) = self.find_user(actor).await? else {
            return Err(Error::unauthorized("login required"));
        };
        if !actor.role().is_admin() {
            return Err(Error::forbidden("admin access required"));
        }
        if new_user.username.as_ref().eq_ignore_ascii_case(ADMIN_USERNAME) {
            return Err(Error::invalid_request("username admin is reserved").with_details(
                json!({ "field": "username", "code": "username_reserved" }),
            ));
        }
        if self.find_by_username(new_user.username.as_ref()).await?.is_some() {
            return Err(username_taken(new_user.username.as_ref()));
        }

        let NewUser {
            username,
            password,
            name,
            avatar,
            skills,
        } = new_user;
        let draft = UserDraft {
            username,
            password_hash: self.hash(&password).await?,
            name,
            role: Role::User,
            avatar,
            skills,
        };
        let user = self
            .users
            .insert(draft)
            .await
            .map_err(Self::map_persistence_error)?;
        info!(user_id = %user.id(), created_by = %actor.id(), "user created");
        Ok(user)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
