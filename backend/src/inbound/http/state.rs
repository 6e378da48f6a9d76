//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LoginService, ProjectRepository, ProjectsCommand, ProjectsQuery, UserAdminCommand,
    UserRepository, UsersQuery,
};
use crate::domain::{AccountService, ProjectService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub user_admin: Arc<dyn UserAdminCommand>,
    pub projects: Arc<dyn ProjectsCommand>,
    pub projects_query: Arc<dyn ProjectsQuery>,
}

impl HttpState {
    /// Expose the two domain services through every driving port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use teamboard::domain::{AccountService, PasswordHasher, ProjectService};
    /// use teamboard::inbound::http::state::HttpState;
    /// use teamboard::outbound::persistence::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let accounts = AccountService::new(store.clone(), Arc::new(PasswordHasher::default()), None);
    /// let projects = ProjectService::new(store.clone(), store, Arc::new(DefaultClock));
    /// let state = HttpState::from_services(accounts, projects);
    /// let _login = state.login.clone();
    /// ```
    pub fn from_services<R, P, U>(accounts: AccountService<R>, projects: ProjectService<P, U>) -> Self
    where
        R: UserRepository + 'static,
        P: ProjectRepository + 'static,
        U: UserRepository + 'static,
    {
        let accounts = Arc::new(accounts);
        let projects = Arc::new(projects);
        Self {
            login: accounts.clone(),
            users: accounts.clone(),
            user_admin: accounts,
            projects: projects.clone(),
            projects_query: projects,
        }
    }
}
