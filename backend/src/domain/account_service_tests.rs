//! Tests for the account service.

use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MockUserRepository;

fn cheap_hasher() -> Arc<PasswordHasher> {
    Arc::new(PasswordHasher::with_costs(8, 1, 1).expect("cheap test params"))
}

fn make_user(id: u64, username: &str, password: &str, role: Role, points: u64) -> User {
    let hash = cheap_hasher().hash(password).expect("hash");
    User::builder(
        UserId::new(id),
        Username::new(username).expect("username"),
        hash,
        DisplayName::new(username).expect("name"),
    )
    .role(role)
    .points(points)
    .build()
}

fn make_service(
    repo: MockUserRepository,
    secret: Option<&str>,
) -> AccountService<MockUserRepository> {
    AccountService::new(
        Arc::new(repo),
        cheap_hasher(),
        secret.and_then(AdminSecret::new),
    )
}

fn repo_with_users(users: Vec<User>) -> MockUserRepository {
    let mut repo = MockUserRepository::new();
    let by_name = users.clone();
    repo.expect_find_by_username().returning(move |name| {
        Ok(by_name
            .iter()
            .find(|user| user.username().as_ref() == name)
            .cloned())
    });
    let by_id = users.clone();
    repo.expect_find_by_id()
        .returning(move |id| Ok(by_id.iter().find(|user| user.id() == id).cloned()));
    repo.expect_list().returning(move || Ok(users.clone()));
    repo
}

#[fixture]
fn ada() -> User {
    make_user(1, "ada", "analytical", Role::User, 0)
}

#[fixture]
fn admin() -> User {
    make_user(99, ADMIN_USERNAME, "s3cret", Role::Admin, 0)
}

fn new_user(username: &str) -> NewUser {
    NewUser::try_from_parts(username, "pw", "New Person", None, vec!["Rust".to_owned()])
        .expect("valid new user")
}

#[rstest]
#[tokio::test]
async fn authenticate_accepts_matching_password(ada: User) {
    let service = make_service(repo_with_users(vec![ada.clone()]), None);
    let creds = LoginCredentials::try_from_parts("ada", "analytical").expect("creds");
    let user = service.authenticate(&creds).await.expect("login succeeds");
    assert_eq!(user.id(), ada.id());
}

#[rstest]
#[case("ada", "wrong")]
#[case("nobody", "analytical")]
#[tokio::test]
async fn authenticate_failures_are_indistinguishable(
    ada: User,
    #[case] username: &str,
    #[case] password: &str,
) {
    let service = make_service(repo_with_users(vec![ada]), None);
    let creds = LoginCredentials::try_from_parts(username, password).expect("creds");
    let err = service.authenticate(&creds).await.expect_err("login fails");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "invalid credentials");
    assert!(err.details().is_none());
}

#[rstest]
#[tokio::test]
async fn authenticate_maps_connection_failures() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .returning(|_| Err(UserPersistenceError::connection("refused")));
    let service = make_service(repo, None);
    let creds = LoginCredentials::try_from_parts("ada", "pw").expect("creds");
    let err = service.authenticate(&creds).await.expect_err("store down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[case(None, "s3cret")]
#[case(Some("s3cret"), "wrong")]
#[case(Some("s3cret"), "")]
#[tokio::test]
async fn admin_login_rejects_without_matching_secret(
    #[case] configured: Option<&str>,
    #[case] attempt: &str,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().times(0);
    repo.expect_insert().times(0);
    let service = make_service(repo, configured);
    let err = service.admin_login(attempt).await.expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "invalid admin password");
}

#[rstest]
#[tokio::test]
async fn admin_login_creates_admin_identity_once() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .times(1)
        .returning(|_| Ok(None));
    repo.expect_insert()
        .withf(|draft| {
            draft.role == Role::Admin
                && draft.username.as_ref() == ADMIN_USERNAME
                && draft.name.as_ref() == ADMIN_DISPLAY_NAME
                && PasswordHasher::with_costs(8, 1, 1)
                    .map(|hasher| hasher.verify("s3cret", &draft.password_hash))
                    .unwrap_or(false)
        })
        .times(1)
        .returning(|draft| Ok(draft.into_user(UserId::new(1))));
    let service = make_service(repo, Some("s3cret"));

    let user = service.admin_login("s3cret").await.expect("admin login");
    assert!(user.role().is_admin());
    assert_eq!(user.points(), 0);
}

#[rstest]
#[tokio::test]
async fn admin_login_reuses_existing_identity(admin: User) {
    let mut repo = repo_with_users(vec![admin.clone()]);
    repo.expect_insert().times(0);
    let service = make_service(repo, Some("s3cret"));
    let user = service.admin_login("s3cret").await.expect("admin login");
    assert_eq!(user.id(), admin.id());
}

#[rstest]
#[tokio::test]
async fn create_user_requires_admin_actor(ada: User) {
    let mut repo = repo_with_users(vec![ada.clone()]);
    repo.expect_insert().times(0);
    let service = make_service(repo, None);

    let err = service
        .create_user(ada.id(), new_user("grace"))
        .await
        .expect_err("non-admin");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let err = service
        .create_user(UserId::new(404), new_user("grace"))
        .await
        .expect_err("unknown actor");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn create_user_rejects_taken_usernames(admin: User, ada: User) {
    let mut repo = repo_with_users(vec![admin.clone(), ada]);
    repo.expect_insert().times(0);
    let service = make_service(repo, None);

    let err = service
        .create_user(admin.id(), new_user("ada"))
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details(),
        Some(&json!({ "field": "username", "code": "username_taken" }))
    );
}

#[rstest]
#[case("admin")]
#[case("ADMIN")]
#[tokio::test]
async fn create_user_reserves_the_admin_username(admin: User, #[case] username: &str) {
    let mut repo = repo_with_users(vec![admin.clone()]);
    repo.expect_insert().times(0);
    let service = make_service(repo, None);
    let err = service
        .create_user(admin.id(), new_user(username))
        .await
        .expect_err("reserved");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_user_hashes_password_and_forces_user_role(admin: User) {
    let mut repo = repo_with_users(vec![admin.clone()]);
    repo.expect_insert()
        .withf(|draft| draft.role == Role::User && draft.skills == vec!["Rust".to_owned()])
        .times(1)
        .returning(|draft| Ok(draft.into_user(UserId::new(2))));
    let service = make_service(repo, None);

    let user = service
        .create_user(admin.id(), new_user("grace"))
        .await
        .expect("created");
    assert_eq!(user.role(), Role::User);
    assert_eq!(user.points(), 0);
    assert!(cheap_hasher().verify("pw", user.password_hash()));
}

#[rstest]
#[tokio::test]
async fn create_user_maps_store_level_duplicates(admin: User) {
    let mut repo = repo_with_users(vec![admin.clone()]);
    repo.expect_insert()
        .returning(|draft| Err(UserPersistenceError::duplicate_username(draft.username.to_string())));
    let service = make_service(repo, None);
    let err = service
        .create_user(admin.id(), new_user("grace"))
        .await
        .expect_err("raced duplicate");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn skill_lookup_ignores_case() {
    let mut rustacean = make_user(1, "ferris", "pw", Role::User, 0);
    rustacean = User::builder(
        rustacean.id(),
        rustacean.username().clone(),
        rustacean.password_hash().clone(),
        rustacean.name().clone(),
    )
    .skills(vec!["Rust".to_owned()])
    .build();
    let other = make_user(2, "gopher", "pw", Role::User, 0);
    let service = make_service(repo_with_users(vec![rustacean, other]), None);

    let users = service.users_with_skill("rUsT").await.expect("query");
    let names: Vec<&str> = users.iter().map(|u| u.username().as_ref()).collect();
    assert_eq!(names, vec!["ferris"]);
}

#[rstest]
#[tokio::test]
async fn leaderboard_orders_by_points_then_username() {
    let users = vec![
        make_user(1, "carol", "pw", Role::User, 50),
        make_user(2, "alice", "pw", Role::User, 50),
        make_user(3, "bob", "pw", Role::User, 90),
        make_user(4, "dave", "pw", Role::User, 10),
    ];
    let service = make_service(repo_with_users(users), None);

    let top = service.leaderboard(3).await.expect("leaderboard");
    let names: Vec<&str> = top.iter().map(|u| u.username().as_ref()).collect();
    assert_eq!(names, vec!["bob", "alice", "carol"]);
}

#[rstest]
#[case(0)]
#[case(MAX_LEADERBOARD_LIMIT + 1)]
#[tokio::test]
async fn leaderboard_rejects_out_of_range_limits(#[case] limit: usize) {
    let mut repo = MockUserRepository::new();
    repo.expect_list().times(0);
    let service = make_service(repo, None);
    let err = service.leaderboard(limit).await.expect_err("bad limit");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
