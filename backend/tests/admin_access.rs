//! End-to-end admin gate: secret login and admin-only user creation.

mod support;

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use support::{ADMIN_SECRET, Harness, login, send};

fn new_user() -> Value {
    json!({ "username": "grace", "password": "cobol", "name": "Grace Hopper" })
}

#[rstest]
#[actix_web::test]
async fn admin_gate_controls_user_creation() {
    let harness = Harness::new();
    harness.seed_user("ada", "lovelace").await;
    let app = actix_test::init_service(harness.app()).await;

    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/admin/login")
            .set_json(json!({ "password": "not-it" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("invalid admin password"));

    let (status, _) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/admin/users")
            .set_json(new_user()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let member = login(&app, "/api/login", json!({ "username": "ada", "password": "lovelace" })).await;
    let (status, _) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/admin/users")
            .set_json(new_user()),
        Some(&member),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = login(&app, "/api/admin/login", json!({ "password": ADMIN_SECRET })).await;
    let (status, created) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/admin/users")
            .set_json(new_user()),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], json!("user"));
    assert!(created.get("password").is_none());

    login(&app, "/api/login", json!({ "username": "grace", "password": "cobol" })).await;
}

#[rstest]
#[actix_web::test]
async fn repeated_admin_logins_reuse_one_identity() {
    let harness = Harness::new();
    let app = actix_test::init_service(harness.app()).await;

    login(&app, "/api/admin/login", json!({ "password": ADMIN_SECRET })).await;
    login(&app, "/api/admin/login", json!({ "password": ADMIN_SECRET })).await;

    let (_, users) = send(&app, actix_test::TestRequest::get().uri("/api/users"), None).await;
    let admins = users
        .as_array()
        .expect("array")
        .iter()
        .filter(|user| user["username"] == json!("admin"))
        .count();
    assert_eq!(admins, 1);
}

#[rstest]
#[actix_web::test]
async fn logout_drops_the_admin_session() {
    let harness = Harness::new();
    let app = actix_test::init_service(harness.app()).await;
    let admin = login(&app, "/api/admin/login", json!({ "password": ADMIN_SECRET })).await;

    let (status, _) = send(&app, actix_test::TestRequest::post().uri("/api/logout"), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, actix_test::TestRequest::get().uri("/api/user"), Some(&admin)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
