//! Route table for the JSON API.

use actix_web::web;

use crate::inbound::http::{admin, health, projects, users};

/// Register every `/api` endpoint under one scope.
///
/// Handlers expect `web::Data<HttpState>` to be registered on the app, and a
/// session middleware to wrap it.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(users::login)
            .service(users::logout)
            .service(users::current_user)
            .service(users::list_users)
            .service(users::users_with_skill)
            .service(users::leaderboard)
            .service(admin::admin_login)
            .service(admin::create_user)
            .service(projects::list_projects)
            .service(projects::get_project)
            .service(projects::create_project)
            .service(projects::update_progress)
            .service(projects::complete_project),
    );
}

/// Register the probes. They need `web::Data<HealthState>`.
pub fn configure_health(cfg: &mut web::ServiceConfig) {
    cfg.service(health::ready).service(health::live);
}
