//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod login_service;
mod project_repository;
mod projects_command;
mod projects_query;
mod user_admin_command;
mod user_repository;
mod users_query;

pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{ProjectPersistenceError, ProjectRepository};
#[cfg(test)]
pub use projects_command::MockProjectsCommand;
pub use projects_command::ProjectsCommand;
#[cfg(test)]
pub use projects_query::MockProjectsQuery;
pub use projects_query::ProjectsQuery;
#[cfg(test)]
pub use user_admin_command::MockUserAdminCommand;
pub use user_admin_command::UserAdminCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::{DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT, UsersQuery};
