//! Tests for the project service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::{MockProjectRepository, MockUserRepository};
use crate::domain::{DisplayName, ErrorCode, PasswordHash, ProjectStatus, UserId, Username};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 8, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn member(id: u64, points: u64) -> User {
    let hash: PasswordHash = "abcd.ef01".parse().expect("fixture hash");
    User::builder(
        UserId::new(id),
        Username::new(format!("member{id}")).expect("username"),
        hash,
        DisplayName::new(format!("Member {id}")).expect("name"),
    )
    .points(points)
    .build()
}

fn draft(members: &[u64], reward: i64) -> NewProject {
    NewProject::try_from_parts(
        "Line follower",
        "Robot that follows tape",
        "Robotics",
        reward,
        members.iter().copied().map(UserId::new).collect(),
        UserId::new(1),
        Vec::new(),
    )
    .expect("valid draft")
}

fn stored(id: u64, members: &[u64], reward: i64, at: DateTime<Utc>) -> Project {
    Project::create(ProjectId::new(id), draft(members, reward), at)
}

fn make_service(
    projects: MockProjectRepository,
    users: MockUserRepository,
    now: DateTime<Utc>,
) -> ProjectService<MockProjectRepository, MockUserRepository> {
    ProjectService::new(
        Arc::new(projects),
        Arc::new(users),
        Arc::new(FixtureClock { utc_now: now }),
    )
}

fn users_returning(users: Vec<User>) -> MockUserRepository {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(users.iter().find(|user| user.id() == id).cloned()));
    repo
}

fn projects_returning(project: Option<Project>) -> MockProjectRepository {
    let mut repo = MockProjectRepository::new();
    repo.expect_find_by_id()
        .returning(move |_| Ok(project.clone()));
    repo
}

#[rstest]
#[tokio::test]
async fn create_stamps_clock_time(now: DateTime<Utc>) {
    let mut projects = MockProjectRepository::new();
    projects
        .expect_insert()
        .withf(move |_, created_at| *created_at == now)
        .times(1)
        .returning(|draft, created_at| Ok(Project::create(ProjectId::new(1), draft, created_at)));
    let service = make_service(projects, MockUserRepository::new(), now);

    let project = service
        .create_project(draft(&[1, 2], 100))
        .await
        .expect("created");
    assert_eq!(project.created_at(), now);
    assert_eq!(project.status(), ProjectStatus::Active);
    assert_eq!(project.progress(), 0);
}

#[rstest]
#[tokio::test]
async fn get_unknown_project_is_not_found(now: DateTime<Utc>) {
    let service = make_service(projects_returning(None), MockUserRepository::new(), now);
    let err = service
        .get_project(ProjectId::new(42))
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn progress_is_stored_without_clamping(now: DateTime<Utc>) {
    let mut projects = projects_returning(Some(stored(3, &[1], 10, now)));
    projects
        .expect_save_progress()
        .with(eq(ProjectId::new(3)), eq(150))
        .times(1)
        .returning(move |id, progress| {
            stored(id.get(), &[1], 10, now)
                .with_progress(progress)
                .map_err(|_| ProjectPersistenceError::already_completed(id.get()))
        });
    let service = make_service(projects, MockUserRepository::new(), now);

    let updated = service
        .update_progress(ProjectId::new(3), 150)
        .await
        .expect("updated");
    assert_eq!(updated.progress(), 150);
}

#[rstest]
#[tokio::test]
async fn progress_on_completed_project_conflicts(now: DateTime<Utc>) {
    let done = stored(3, &[1], 10, now).completed().expect("active");
    let mut projects = projects_returning(Some(done));
    projects.expect_save_progress().times(0);
    let service = make_service(projects, MockUserRepository::new(), now);

    let err = service
        .update_progress(ProjectId::new(3), 20)
        .await
        .expect_err("completed");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn progress_on_unknown_project_is_not_found(now: DateTime<Utc>) {
    let mut projects = projects_returning(None);
    projects.expect_save_progress().times(0);
    let service = make_service(projects, MockUserRepository::new(), now);
    let err = service
        .update_progress(ProjectId::new(8), 20)
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn completion_landing_before_the_progress_write_conflicts(now: DateTime<Utc>) {
    let mut projects = projects_returning(Some(stored(3, &[1], 10, now)));
    projects
        .expect_save_progress()
        .times(1)
        .returning(|id, _| Err(ProjectPersistenceError::already_completed(id.get())));
    let service = make_service(projects, MockUserRepository::new(), now);

    let err = service
        .update_progress(ProjectId::new(3), 40)
        .await
        .expect_err("completed concurrently");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.details(), Some(&json!({ "code": "already_completed" })));
}

#[rstest]
#[tokio::test]
async fn project_removed_before_the_progress_write_is_not_found(now: DateTime<Utc>) {
    let mut projects = projects_returning(Some(stored(3, &[1], 10, now)));
    projects
        .expect_save_progress()
        .returning(|id, _| Err(ProjectPersistenceError::missing(id.get())));
    let service = make_service(projects, MockUserRepository::new(), now);

    let err = service
        .update_progress(ProjectId::new(3), 40)
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn complete_commits_the_completed_project_once(now: DateTime<Utc>) {
    let mut projects = projects_returning(Some(stored(5, &[1, 2], 100, now)));
    projects
        .expect_commit_completion()
        .withf(|project| {
            project.is_completed()
                && project.progress() == 100
                && project.team_members() == [UserId::new(1), UserId::new(2)]
        })
        .times(1)
        .returning(|_| Ok(()));
    let users = users_returning(vec![member(1, 0), member(2, 30)]);
    let service = make_service(projects, users, now);

    let project = service
        .complete_project(ProjectId::new(5))
        .await
        .expect("completed");
    assert_eq!(project.status(), ProjectStatus::Completed);
    assert_eq!(project.progress(), 100);
}

#[rstest]
#[tokio::test]
async fn complete_refuses_overflowing_balances(now: DateTime<Utc>) {
    let mut projects = projects_returning(Some(stored(5, &[1], 1, now)));
    projects.expect_commit_completion().times(0);
    let service = make_service(projects, users_returning(vec![member(1, u64::MAX)]), now);

    let err = service
        .complete_project(ProjectId::new(5))
        .await
        .expect_err("overflow");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn member_removed_before_commit_is_not_found(now: DateTime<Utc>) {
    let mut projects = projects_returning(Some(stored(5, &[1], 10, now)));
    projects
        .expect_commit_completion()
        .returning(|_| Err(ProjectPersistenceError::missing_member(1_u64)));
    let service = make_service(projects, users_returning(vec![member(1, 0)]), now);

    let err = service
        .complete_project(ProjectId::new(5))
        .await
        .expect_err("member vanished");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn completing_twice_conflicts_without_crediting(now: DateTime<Utc>) {
    let done = stored(5, &[1], 100, now).completed().expect("active");
    let mut projects = projects_returning(Some(done));
    projects.expect_commit_completion().times(0);
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().times(0);
    let service = make_service(projects, users, now);

    let err = service
        .complete_project(ProjectId::new(5))
        .await
        .expect_err("already completed");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.details(), Some(&json!({ "code": "already_completed" })));
}

#[rstest]
#[tokio::test]
async fn missing_member_aborts_before_commit(now: DateTime<Utc>) {
    let mut projects = projects_returning(Some(stored(5, &[1, 7], 100, now)));
    projects.expect_commit_completion().times(0);
    let users = users_returning(vec![member(1, 0)]);
    let service = make_service(projects, users, now);

    let err = service
        .complete_project(ProjectId::new(5))
        .await
        .expect_err("member missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert!(err.message().contains("team member 7"));
}

#[rstest]
#[tokio::test]
async fn store_level_completion_race_maps_to_conflict(now: DateTime<Utc>) {
    let mut projects = projects_returning(Some(stored(5, &[1], 100, now)));
    projects
        .expect_commit_completion()
        .returning(|_| Err(ProjectPersistenceError::already_completed(5_u64)));
    let service = make_service(projects, users_returning(vec![member(1, 0)]), now);

    let err = service
        .complete_project(ProjectId::new(5))
        .await
        .expect_err("raced");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn unreachable_store_is_service_unavailable(now: DateTime<Utc>) {
    let mut projects = MockProjectRepository::new();
    projects
        .expect_list()
        .returning(|| Err(ProjectPersistenceError::connection("timeout")));
    let service = make_service(projects, MockUserRepository::new(), now);
    let err = service.list_projects().await.expect_err("down");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn get_returns_the_stored_project(now: DateTime<Utc>) {
    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_id()
        .with(eq(ProjectId::new(2)))
        .returning(move |id| Ok(Some(stored(id.get(), &[], 0, now))));
    let service = make_service(projects, MockUserRepository::new(), now);
    let project = service.get_project(ProjectId::new(2)).await.expect("found");
    assert_eq!(project.id(), ProjectId::new(2));
}
