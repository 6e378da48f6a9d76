//! Backend entry-point: loads settings, wires the store and serves the API.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use teamboard::inbound::http::health::HealthState;
use teamboard::inbound::http::session_config::{BuildMode, session_settings_from_env};

use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|err| io::Error::other(format!("failed to load settings: {err}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    let config = ServerConfig::from_settings(&settings, session).map_err(io::Error::other)?;

    if !config.admin_enabled() {
        warn!("TEAMBOARD_ADMIN_SECRET is not set; admin login is disabled");
    }
    info!(
        bind_addr = %config.bind_addr(),
        document_store = config.uses_document_store(),
        "starting server"
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;

    let drain_state = health_state.clone();
    actix_web::rt::spawn(async move {
        if actix_web::rt::signal::ctrl_c().await.is_ok() {
            drain_state.mark_draining();
        }
    });

    server.await
}
