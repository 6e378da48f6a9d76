//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, plus the services that implement the driving ports. Types keep
//! their fields private and document invariants in their Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - User, Project: the two aggregates.
//! - AccountService, ProjectService: driving port implementations.

mod account_service;
pub mod auth;
pub mod error;
pub mod password;
pub mod points;
pub mod ports;
pub mod project;
mod project_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{AdminSecret, LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::password::{PasswordHash, PasswordHashError, PasswordHasher};
pub use self::points::PointsError;
pub use self::project::{
    AlreadyCompleted, Category, NewProject, Project, ProjectId, ProjectParts, ProjectStatus,
    ProjectValidationError,
};
pub use self::project_service::ProjectService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DisplayName, NewUser, Role, User, UserBuilder, UserDraft, UserId, UserValidationError,
    Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use teamboard::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
