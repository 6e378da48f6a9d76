//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::build_http_state;

use std::time::Duration;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
};
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use teamboard::Trace;
#[cfg(debug_assertions)]
use teamboard::doc::ApiDoc;
use teamboard::inbound::http::health::HealthState;
use teamboard::inbound::http::routes::{configure_api, configure_health};
use teamboard::inbound::http::state::HttpState;
use teamboard::inbound::http::validation::{json_config, query_config};
use teamboard::outbound::session::MemorySessionStore;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// How often expired sessions are swept from the store.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    sessions: MemorySessionStore,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
    session_ttl: CookieDuration,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        sessions,
        key,
        cookie_secure,
        same_site,
        session_ttl,
    } = deps;

    let session = SessionMiddleware::builder(sessions, key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(session_ttl))
        .build();

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .wrap(session)
        .wrap(Trace)
        .configure(configure_api)
        .configure(configure_health);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Drop expired sessions periodically for the life of the process.
fn spawn_session_sweeper(sessions: MemorySessionStore) {
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sessions.purge_expired().await;
        }
    });
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// The health state enters the serving phase once the listener is bound.
///
/// # Errors
/// Fails when the document store client cannot be built or the socket cannot
/// be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        session_ttl,
        store,
        admin_secret,
    } = config;
    let http_state = build_http_state(store, admin_secret).map_err(std::io::Error::other)?;
    let http_state = web::Data::new(http_state);
    let sessions = MemorySessionStore::new();
    spawn_session_sweeper(sessions.clone());

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            sessions: sessions.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
            session_ttl,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
