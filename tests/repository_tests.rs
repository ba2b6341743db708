//! 仓库层集成测试
//!
//! 需要真实 PostgreSQL：`TEST_DATABASE_URL=... cargo test -- --ignored`

use datatask::{
    error::AppError,
    models::{
        project::CreateProjectRequest,
        task::{CreateTaskRequest, UpdateTaskRequest},
        user::{NewUser, UpdateUserRequest},
    },
    repository::{
        CommentRepository, KanbanRepository, NotificationRepository, ProjectRepository,
        ProjectStore, TaskRepository, UserFinder, UserRepository, UserStore,
    },
};
use serial_test::serial;
use sqlx::PgPool;

mod common;
use common::setup_test_db;

async fn create_user(pool: &PgPool, email: &str) -> i64 {
    UserRepository::new(pool.clone())
        .create(&NewUser {
            name: "Test".to_string(),
            surname: "User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        })
        .await
        .expect("create user")
        .id
}

async fn create_project(pool: &PgPool, owner_id: i64) -> i64 {
    ProjectRepository::new(pool.clone())
        .create(
            owner_id,
            &CreateProjectRequest {
                name: "Roadmap".to_string(),
                description: String::new(),
                color: "#ff0000".to_string(),
                parent_project_id: None,
            },
        )
        .await
        .expect("create project")
        .id
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_user_repository_create_and_find() {
    let pool = setup_test_db().await;
    let repo = UserRepository::new(pool.clone());

    let id = create_user(&pool, "alice@example.com").await;

    let by_email = repo.find_by_email("alice@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, id);

    let by_id = repo.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "alice@example.com");

    assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_user_repository_duplicate_email_conflicts() {
    let pool = setup_test_db().await;
    create_user(&pool, "dup@example.com").await;

    let result = UserRepository::new(pool.clone())
        .create(&NewUser {
            name: "Other".to_string(),
            surname: "User".to_string(),
            email: "dup@example.com".to_string(),
            password_hash: "x".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_user_repository_update_and_delete() {
    let pool = setup_test_db().await;
    let repo = UserRepository::new(pool.clone());
    let id = create_user(&pool, "bob@example.com").await;

    let updated = repo
        .update(
            id,
            &UpdateUserRequest {
                name: Some("Robert".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Robert");
    assert_eq!(updated.surname, "User");

    assert!(repo.update_password(id, "new-hash").await.unwrap());
    assert!(repo.delete(id).await.unwrap());
    assert!(!repo.delete(id).await.unwrap());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_membership_lifecycle() {
    let pool = setup_test_db().await;
    let owner = create_user(&pool, "owner@example.com").await;
    let bob = create_user(&pool, "bob@example.com").await;
    let project_id = create_project(&pool, owner).await;

    let repo = ProjectRepository::new(pool.clone());

    let member = repo
        .insert_invitation(project_id, bob, "editor", owner)
        .await
        .unwrap()
        .expect("first invitation inserted");
    assert!(member.is_pending());

    // 重复邀请不覆盖
    assert!(repo
        .insert_invitation(project_id, bob, "viewer", owner)
        .await
        .unwrap()
        .is_none());

    assert!(repo.list_shared(bob).await.unwrap().is_empty());

    let joined = repo.mark_joined(project_id, bob).await.unwrap().unwrap();
    assert!(joined.joined_at.is_some());
    assert_eq!(joined.permission, "editor");

    let shared = repo.list_shared(bob).await.unwrap();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].id, project_id);

    let members = repo.list_members(project_id).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].email, "bob@example.com");

    assert!(repo.mark_joined(project_id, owner).await.unwrap().is_none());

    assert!(repo.delete_project(project_id).await.unwrap());
    assert!(repo.find_membership(project_id, bob).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_task_board_flow() {
    let pool = setup_test_db().await;
    let owner = create_user(&pool, "owner@example.com").await;
    let project_id = create_project(&pool, owner).await;

    let kanban = KanbanRepository::new(pool.clone())
        .create(project_id, "Todo")
        .await
        .unwrap();

    let tasks = TaskRepository::new(pool.clone());
    let task = tasks
        .create(&CreateTaskRequest {
            kanban_id: kanban.id,
            title: "Write docs".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    assert_eq!(tasks.project_id_of(task.id).await.unwrap(), Some(project_id));

    let done = tasks
        .update(
            task.id,
            &UpdateTaskRequest {
                is_completed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert!(done.is_completed);
    assert_eq!(done.title, "Write docs");

    assert!(tasks.assign(task.id, owner).await.unwrap());
    assert!(!tasks.assign(task.id, owner).await.unwrap());
    assert_eq!(tasks.list_by_user(owner).await.unwrap().len(), 1);
    assert_eq!(tasks.list_by_project(project_id).await.unwrap().len(), 1);

    let comments = CommentRepository::new(pool.clone());
    comments.create(task.id, owner, "looks good").await.unwrap();
    assert_eq!(comments.list_by_task(task.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_notification_mark_read_owner_only() {
    let pool = setup_test_db().await;
    let alice = create_user(&pool, "alice@example.com").await;
    let bob = create_user(&pool, "bob@example.com").await;

    let repo = NotificationRepository::new(pool.clone());
    let first = repo.create(alice, "first", "").await.unwrap();
    let second = repo.create(alice, "second", "").await.unwrap();

    let listed = repo.list_by_owner(alice).await.unwrap();
    assert_eq!(listed[0].id, second.id);

    assert!(repo.mark_read(first.id, bob).await.unwrap().is_none());
    assert!(repo.mark_read(first.id, alice).await.unwrap().unwrap().is_read);
}
