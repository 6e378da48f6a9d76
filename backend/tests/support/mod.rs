//! Shared harness for end-to-end API tests.
//!
//! Builds the full `/api` app over an in-memory store with the same session
//! middleware settings the server uses, minus the `Secure` flag.
#![allow(dead_code, reason = "each test binary uses a subset of the helpers")]

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::CookieContentSecurity;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use mockable::DefaultClock;
use serde_json::Value;

use teamboard::Trace;
use teamboard::domain::ports::UserRepository;
use teamboard::domain::{
    AccountService, AdminSecret, DisplayName, PasswordHasher, ProjectService, Role, User, UserDraft,
    UserId, Username,
};
use teamboard::inbound::http::routes::configure_api;
use teamboard::inbound::http::state::HttpState;
use teamboard::inbound::http::validation::{json_config, query_config};
use teamboard::outbound::persistence::InMemoryStore;
use teamboard::outbound::session::MemorySessionStore;

pub const ADMIN_SECRET: &str = "integration-secret";

/// Store plus the handler state built over it.
pub struct Harness {
    pub store: InMemoryStore,
    hasher: Arc<PasswordHasher>,
    state: web::Data<HttpState>,
    sessions: MemorySessionStore,
    key: Key,
}

impl Harness {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let shared = Arc::new(store.clone());
        let hasher = Arc::new(PasswordHasher::with_costs(8, 1, 1).expect("cheap test params"));
        let accounts =
            AccountService::new(shared.clone(), hasher.clone(), AdminSecret::new(ADMIN_SECRET));
        let projects = ProjectService::new(shared.clone(), shared, Arc::new(DefaultClock));
        Self {
            store,
            hasher,
            state: web::Data::new(HttpState::from_services(accounts, projects)),
            sessions: MemorySessionStore::new(),
            key: Key::generate(),
        }
    }

    pub async fn seed_user(&self, username: &str, password: &str) -> User {
        let draft = UserDraft {
            username: Username::new(username).expect("username"),
            password_hash: self.hasher.hash(password).expect("hash"),
            name: DisplayName::new(username).expect("name"),
            role: Role::User,
            avatar: None,
            skills: Vec::new(),
        };
        UserRepository::insert(&self.store, draft)
            .await
            .expect("insert user")
    }

    pub async fn points_of(&self, id: u64) -> u64 {
        UserRepository::find_by_id(&self.store, UserId::new(id))
            .await
            .expect("store reachable")
            .expect("user exists")
            .points()
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let session = SessionMiddleware::builder(self.sessions.clone(), self.key.clone())
            .cookie_name("session".into())
            .cookie_secure(false)
            .cookie_content_security(CookieContentSecurity::Private)
            .build();
        App::new()
            .app_data(self.state.clone())
            .app_data(json_config())
            .app_data(query_config())
            .wrap(session)
            .wrap(Trace)
            .configure(configure_api)
    }
}

/// Status and JSON body (or `Null`) of one request.
pub async fn send<S>(app: &S, request: actix_test::TestRequest, cookie: Option<&Cookie<'static>>) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = match cookie {
        Some(cookie) => request.cookie(cookie.clone()),
        None => request,
    };
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

/// Post `body` to a login endpoint and return the session cookie.
pub async fn login<S>(app: &S, uri: &str, body: Value) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let request = actix_test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert_eq!(response.status(), StatusCode::OK, "login to {uri} failed");
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}
