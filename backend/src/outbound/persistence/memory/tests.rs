//! Tests for the in-memory store.

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{DisplayName, PasswordHash, Role, Username};

fn draft_user(username: &str) -> UserDraft {
    UserDraft {
        username: Username::new(username).expect("username"),
        password_hash: "abcd.ef01".parse::<PasswordHash>().expect("hash"),
        name: DisplayName::new(username).expect("name"),
        role: Role::User,
        avatar: None,
        skills: Vec::new(),
    }
}

fn draft_project(members: &[u64], reward: i64) -> NewProject {
    NewProject::try_from_parts(
        "Weather station",
        "",
        "Robotics",
        reward,
        members.iter().copied().map(UserId::new).collect(),
        UserId::new(1),
        Vec::new(),
    )
    .expect("valid draft")
}

fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0)
        .single()
        .expect("timestamp")
}

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

async fn seeded(store: &InMemoryStore) -> Project {
    UserRepository::insert(store, draft_user("ada"))
        .await
        .expect("ada");
    UserRepository::insert(store, draft_user("bob"))
        .await
        .expect("bob");
    ProjectRepository::insert(store, draft_project(&[1, 2], 100), created_at())
        .await
        .expect("project")
}

async fn points_of(store: &InMemoryStore, id: u64) -> u64 {
    UserRepository::find_by_id(store, UserId::new(id))
        .await
        .expect("query")
        .expect("user exists")
        .points()
}

#[rstest]
#[tokio::test]
async fn inserts_allocate_sequential_ids(store: InMemoryStore) {
    let first = UserRepository::insert(&store, draft_user("ada"))
        .await
        .expect("first");
    let second = UserRepository::insert(&store, draft_user("bob"))
        .await
        .expect("second");
    assert_eq!(first.id(), UserId::new(1));
    assert_eq!(second.id(), UserId::new(2));

    let project = ProjectRepository::insert(&store, draft_project(&[1], 5), created_at())
        .await
        .expect("project");
    assert_eq!(project.id(), ProjectId::new(1));
}

#[rstest]
#[tokio::test]
async fn duplicate_usernames_are_rejected(store: InMemoryStore) {
    UserRepository::insert(&store, draft_user("ada"))
        .await
        .expect("first");
    let err = UserRepository::insert(&store, draft_user("ada"))
        .await
        .expect_err("duplicate");
    assert_eq!(err, UserPersistenceError::duplicate_username("ada"));
    assert_eq!(UserRepository::list(&store).await.expect("list").len(), 1);
}

#[rstest]
#[tokio::test]
async fn finds_users_by_username(store: InMemoryStore) {
    seeded(&store).await;
    let bob = store
        .find_by_username("bob")
        .await
        .expect("query")
        .expect("bob exists");
    assert_eq!(bob.id(), UserId::new(2));
    assert!(store.find_by_username("carol").await.expect("query").is_none());
}

#[rstest]
#[tokio::test]
async fn commit_marks_completed_and_credits_roster(store: InMemoryStore) {
    let project = seeded(&store).await;
    let completed = project.completed().expect("active");

    store.commit_completion(&completed).await.expect("commit");

    let stored = ProjectRepository::find_by_id(&store, project.id())
        .await
        .expect("query")
        .expect("project exists");
    assert!(stored.is_completed());
    assert_eq!(stored.progress(), 100);
    assert_eq!(points_of(&store, 1).await, 100);
    assert_eq!(points_of(&store, 2).await, 100);
}

#[rstest]
#[tokio::test]
async fn second_commit_conflicts_and_leaves_balances(store: InMemoryStore) {
    let project = seeded(&store).await;
    let completed = project.completed().expect("active");
    store.commit_completion(&completed).await.expect("first commit");

    let err = store
        .commit_completion(&completed)
        .await
        .expect_err("second commit");
    assert_eq!(err, ProjectPersistenceError::already_completed(1_u64));
    assert_eq!(points_of(&store, 1).await, 100);
    assert_eq!(points_of(&store, 2).await, 100);
}

#[rstest]
#[tokio::test]
async fn commit_credits_from_current_balances(store: InMemoryStore) {
    seeded(&store).await;
    let first = ProjectRepository::insert(&store, draft_project(&[1], 30), created_at())
        .await
        .expect("first");
    let second = ProjectRepository::insert(&store, draft_project(&[1], 12), created_at())
        .await
        .expect("second");

    // Both completions were prepared against the same starting balance.
    let first = first.completed().expect("active");
    let second = second.completed().expect("active");
    store.commit_completion(&first).await.expect("first commit");
    store.commit_completion(&second).await.expect("second commit");

    assert_eq!(points_of(&store, 1).await, 42);
}

#[rstest]
#[tokio::test]
async fn commit_with_unknown_member_writes_nothing(store: InMemoryStore) {
    UserRepository::insert(&store, draft_user("ada"))
        .await
        .expect("ada");
    let project = ProjectRepository::insert(&store, draft_project(&[1, 9], 10), created_at())
        .await
        .expect("project");

    let err = store
        .commit_completion(&project.completed().expect("active"))
        .await
        .expect_err("missing member");
    assert_eq!(err, ProjectPersistenceError::missing_member(9_u64));
    assert_eq!(points_of(&store, 1).await, 0);
    let stored = ProjectRepository::find_by_id(&store, project.id())
        .await
        .expect("query")
        .expect("project exists");
    assert!(!stored.is_completed());
}

#[rstest]
#[tokio::test]
async fn progress_on_unknown_project_is_missing(store: InMemoryStore) {
    let err = store
        .save_progress(ProjectId::new(77), 10)
        .await
        .expect_err("unknown project");
    assert_eq!(err, ProjectPersistenceError::missing(77_u64));
}

#[rstest]
#[tokio::test]
async fn progress_is_stored_as_given(store: InMemoryStore) {
    let project = seeded(&store).await;
    let updated = store
        .save_progress(project.id(), 150)
        .await
        .expect("save progress");
    assert_eq!(updated.progress(), 150);
    let stored = ProjectRepository::find_by_id(&store, project.id())
        .await
        .expect("query")
        .expect("project exists");
    assert_eq!(stored.progress(), 150);
    assert!(!stored.is_completed());
}

#[rstest]
#[tokio::test]
async fn progress_read_before_a_completion_cannot_reopen_it(store: InMemoryStore) {
    let project = seeded(&store).await;
    let before_completion = ProjectRepository::find_by_id(&store, project.id())
        .await
        .expect("query")
        .expect("project exists");
    assert!(before_completion.with_progress(40).is_ok());

    store
        .commit_completion(&project.completed().expect("active"))
        .await
        .expect("commit");
    let err = store
        .save_progress(project.id(), 40)
        .await
        .expect_err("completed in between");
    assert_eq!(err, ProjectPersistenceError::already_completed(1_u64));

    let stored = ProjectRepository::find_by_id(&store, project.id())
        .await
        .expect("query")
        .expect("project exists");
    assert!(stored.is_completed());
    assert_eq!(stored.progress(), 100);

    let again = store
        .commit_completion(&project.completed().expect("active"))
        .await
        .expect_err("still completed");
    assert_eq!(again, ProjectPersistenceError::already_completed(1_u64));
    assert_eq!(points_of(&store, 1).await, 100);
    assert_eq!(points_of(&store, 2).await, 100);
}

#[rstest]
#[tokio::test]
async fn clones_share_records(store: InMemoryStore) {
    let other = store.clone();
    UserRepository::insert(&store, draft_user("ada"))
        .await
        .expect("ada");
    assert_eq!(UserRepository::list(&other).await.expect("list").len(), 1);
}
