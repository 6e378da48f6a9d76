//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::web;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::UserRepository;
use crate::domain::{
    AccountService, AdminSecret, DisplayName, PasswordHasher, ProjectService, Role, User,
    UserDraft, Username,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::InMemoryStore;
use crate::outbound::session::MemorySessionStore;

/// Build a session middleware configured for tests.
///
/// - Uses a fresh in-memory store and signing key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<MemorySessionStore> {
    SessionMiddleware::builder(MemorySessionStore::new(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Admin secret configured by [`TestWorld`].
pub const ADMIN_SECRET: &str = "board-secret";

/// Services over a fresh in-memory store, with a cheap hasher so tests stay
/// fast.
pub struct TestWorld {
    pub store: InMemoryStore,
    pub hasher: Arc<PasswordHasher>,
    pub state: HttpState,
}

impl TestWorld {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let hasher = Arc::new(PasswordHasher::with_costs(8, 1, 1).expect("cheap test params"));
        let shared = Arc::new(store.clone());
        let accounts =
            AccountService::new(shared.clone(), hasher.clone(), AdminSecret::new(ADMIN_SECRET));
        let clock = Arc::new(FixtureClock(fixture_time()));
        let projects = ProjectService::new(shared.clone(), shared, clock);
        Self {
            store,
            hasher,
            state: HttpState::from_services(accounts, projects),
        }
    }

    /// Store a user with `password` and `role`.
    pub async fn add_user(&self, username: &str, password: &str, role: Role) -> User {
        let draft = UserDraft {
            username: Username::new(username).expect("username"),
            password_hash: self.hasher.hash(password).expect("hash"),
            name: DisplayName::new(username).expect("name"),
            role,
            avatar: None,
            skills: vec!["Rust".to_owned()],
        };
        UserRepository::insert(&self.store, draft)
            .await
            .expect("insert user")
    }

    pub fn data(&self) -> web::Data<HttpState> {
        web::Data::new(self.state.clone())
    }
}

/// Timestamp stamped on projects created through [`TestWorld`].
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 8, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock(DateTime<Utc>);

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Extract the session cookie set by `res`.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}
