/// Integration tests for board reconciliation and board queries
///
/// These tests require a running PostgreSQL database:
///
/// ```bash
/// DATABASE_URL=postgresql://localhost/workboard_test cargo test --test reconcile_tests -- --ignored
/// ```

use sqlx::PgPool;
use uuid::Uuid;
use workboard_shared::{
    db::migrations::run_migrations,
    models::{
        board::{Board, CreateBoard},
        task::{Task, TaskStatus},
        user::{CreateUser, User, UserRole},
    },
    services::{
        query,
        reconcile::{self, BoardFields, TaskEdit},
        ServiceError,
    },
};

async fn setup() -> anyhow::Result<PgPool> {
    dotenvy::dotenv().ok();
    let pool = PgPool::connect(&std::env::var("DATABASE_URL")?).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}

async fn user(pool: &PgPool, prefix: &str) -> User {
    User::create(
        pool,
        CreateUser {
            username: format!("{}-{}", prefix, Uuid::new_v4()),
            email: String::new(),
            role: UserRole::Owner,
            password_hash: "x".to_string(),
        },
    )
    .await
    .expect("Failed to create user")
}

fn new_task(title: &str) -> TaskEdit {
    TaskEdit {
        title: Some(title.to_string()),
        ..Default::default()
    }
}

fn board_data(title: &str, owner: &User) -> CreateBoard {
    CreateBoard {
        title: title.to_string(),
        description: String::new(),
        owner_id: owner.id,
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_create_board_with_tasks() {
    let pool = setup().await.unwrap();
    let owner = user(&pool, "owner").await;
    let helper = user(&pool, "helper").await;

    let created = reconcile::create_board(
        &pool,
        CreateBoard {
            title: "Sprint 1".to_string(),
            description: "First iteration".to_string(),
            owner_id: owner.id,
        },
        vec![
            new_task("A"),
            TaskEdit {
                status: Some("in_progress".to_string()),
                assigned_to_id: Some(helper.id),
                ..new_task("B")
            },
        ],
    )
    .await
    .unwrap();

    assert_eq!(created.board.title, "Sprint 1");
    assert_eq!(created.tasks.len(), 2);
    assert_eq!(created.tasks[0].title, "A");
    assert_eq!(created.tasks[0].status, TaskStatus::Todo);
    assert_eq!(created.tasks[0].assigned_to, None);
    assert_eq!(created.tasks[1].status, TaskStatus::InProgress);
    assert_eq!(created.tasks[1].assigned_to, Some(helper.id));
    assert!(created.tasks.iter().all(|t| t.board_id == created.board.id));

    let board_id = created.board.id;
    assert_eq!(query::task_count(&pool, board_id).await.unwrap(), 2);

    let done = query::tasks_by_status(&pool, board_id, "done").await.unwrap();
    assert!(done.is_empty());

    let todo = query::tasks_by_status(&pool, board_id, "todo").await.unwrap();
    assert_eq!(todo.len(), 1);

    let users = query::users_on_board(&pool, board_id).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, helper.id);

    User::delete(&pool, owner.id).await.unwrap();
    User::delete(&pool, helper.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_create_board_unknown_owner_or_assignee() {
    let pool = setup().await.unwrap();
    let owner = user(&pool, "owner").await;

    let ghost = CreateBoard {
        title: "Ghost".to_string(),
        description: String::new(),
        owner_id: Uuid::new_v4(),
    };
    let result = reconcile::create_board(&pool, ghost, vec![]).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let bad_assignee = TaskEdit {
        assigned_to_id: Some(Uuid::new_v4()),
        ..new_task("A")
    };
    let result = reconcile::create_board(&pool, board_data("Orphan", &owner), vec![bad_assignee]).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    // Nothing from the failed batch was kept
    let (boards,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM boards WHERE owner_id = $1")
        .bind(owner.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(boards, 0);

    User::delete(&pool, owner.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_reconcile_merges_and_is_atomic() {
    let pool = setup().await.unwrap();
    let owner = user(&pool, "owner").await;
    let helper = user(&pool, "helper").await;

    let assigned = TaskEdit {
        description: Some("notes".to_string()),
        assigned_to_id: Some(helper.id),
        ..new_task("A")
    };
    let first = reconcile::create_board(&pool, board_data("One", &owner), vec![assigned])
        .await
        .unwrap();
    let second = reconcile::create_board(&pool, board_data("Two", &owner), vec![new_task("X")])
        .await
        .unwrap();
    let task_a = first.tasks[0].id;
    let task_x = second.tasks[0].id;

    // An empty partial changes nothing
    let same = reconcile::reconcile(&pool, first.board.id, BoardFields::default(), vec![])
        .await
        .unwrap();
    assert_eq!(same.board.title, "One");
    assert_eq!(same.tasks.len(), 1);

    // So does an edit carrying only the task id
    let before = Task::find_by_id(&pool, task_a).await.unwrap().unwrap();
    let touched = reconcile::reconcile(
        &pool,
        first.board.id,
        BoardFields::default(),
        vec![TaskEdit {
            id: Some(task_a),
            ..Default::default()
        }],
    )
    .await
    .unwrap();
    assert_eq!(touched.tasks.len(), 1);
    let after = reconcile::edit_task(&pool, task_a, TaskEdit::default()).await.unwrap();
    for task in [&touched.tasks[0], &after] {
        assert_eq!(task.title, "A");
        assert_eq!(task.description, "notes");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.assigned_to, Some(helper.id));
        assert_eq!(task.updated_at, before.updated_at);
    }

    // Editing a task of another board fails and rolls back the whole batch
    let result = reconcile::reconcile(
        &pool,
        first.board.id,
        BoardFields {
            title: Some("Renamed".to_string()),
            description: None,
        },
        vec![
            TaskEdit {
                id: Some(task_a),
                status: Some("completed".to_string()),
                ..Default::default()
            },
            new_task("B"),
            TaskEdit {
                id: Some(task_x),
                title: Some("stolen".to_string()),
                ..Default::default()
            },
        ],
    )
    .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let unchanged = query::board_with_tasks(&pool, first.board.id).await.unwrap().unwrap();
    assert_eq!(unchanged.board.title, "One");
    assert_eq!(unchanged.tasks.len(), 1);
    assert_eq!(unchanged.tasks[0].status, TaskStatus::Todo);
    let x = Task::find_by_id(&pool, task_x).await.unwrap().unwrap();
    assert_eq!(x.title, "X");
    assert_eq!(x.board_id, second.board.id);

    // The same batch without the foreign task succeeds
    let merged = reconcile::reconcile(
        &pool,
        first.board.id,
        BoardFields {
            title: Some("Renamed".to_string()),
            description: None,
        },
        vec![
            TaskEdit {
                id: Some(task_a),
                status: Some("completed".to_string()),
                ..Default::default()
            },
            new_task("B"),
        ],
    )
    .await
    .unwrap();
    assert_eq!(merged.board.title, "Renamed");
    assert_eq!(merged.tasks.len(), 2);
    assert_eq!(merged.tasks[0].title, "A");
    assert_eq!(merged.tasks[0].status, TaskStatus::Completed);
    assert_eq!(merged.tasks[1].title, "B");

    User::delete(&pool, owner.id).await.unwrap();
    User::delete(&pool, helper.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_ownership_guard() {
    let pool = setup().await.unwrap();
    let owner = user(&pool, "owner").await;
    let intruder = user(&pool, "intruder").await;

    let board = reconcile::create_board(&pool, board_data("Mine", &owner), vec![new_task("A")])
        .await
        .unwrap()
        .board;

    let result = reconcile::update_board(
        &pool,
        board.id,
        intruder.id,
        BoardFields {
            title: Some("Hijacked".to_string()),
            description: None,
        },
        vec![new_task("Injected")],
    )
    .await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let result = reconcile::update_board(&pool, board.id, Uuid::new_v4(), BoardFields::default(), vec![]).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let result = reconcile::delete_board(&pool, board.id, intruder.id).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let unchanged = query::board_with_tasks(&pool, board.id).await.unwrap().unwrap();
    assert_eq!(unchanged.board.title, "Mine");
    assert_eq!(unchanged.tasks.len(), 1);

    let replaced = reconcile::replace_board(
        &pool,
        board.id,
        owner.id,
        "Ours".to_string(),
        "shared".to_string(),
        vec![],
    )
    .await
    .unwrap();
    assert_eq!(replaced.board.title, "Ours");
    assert_eq!(replaced.board.description, "shared");

    reconcile::delete_board(&pool, board.id, owner.id).await.unwrap();
    assert!(query::board_with_tasks(&pool, board.id).await.unwrap().is_none());
    assert_eq!(query::task_count(&pool, board.id).await.unwrap(), 0);

    User::delete(&pool, owner.id).await.unwrap();
    User::delete(&pool, intruder.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_single_task_operations_and_cascades() {
    let pool = setup().await.unwrap();
    let owner = user(&pool, "owner").await;
    let helper = user(&pool, "helper").await;

    let board = reconcile::create_board(&pool, board_data("Solo", &owner), vec![])
        .await
        .unwrap()
        .board;

    let result = reconcile::add_task(&pool, Uuid::new_v4(), new_task("A")).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    // An id on a new task is ignored
    let task = reconcile::add_task(
        &pool,
        board.id,
        TaskEdit {
            id: Some(Uuid::new_v4()),
            assigned_to_id: Some(helper.id),
            ..new_task("A")
        },
    )
    .await
    .unwrap();
    assert_eq!(task.board_id, board.id);
    assert_eq!(task.assigned_to, Some(helper.id));

    let result = reconcile::edit_task(&pool, Uuid::new_v4(), new_task("B")).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let result = reconcile::edit_task(
        &pool,
        task.id,
        TaskEdit {
            status: Some("done".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::Invalid(_))));

    let edited = reconcile::edit_task(&pool, task.id, new_task("B")).await.unwrap();
    assert_eq!(edited.title, "B");
    assert_eq!(edited.assigned_to, Some(helper.id));

    // Deleting the assignee unassigns the task
    User::delete(&pool, helper.id).await.unwrap();
    let orphan = Task::find_by_id(&pool, task.id).await.unwrap().unwrap();
    assert_eq!(orphan.assigned_to, None);
    assert!(query::users_on_board(&pool, board.id).await.unwrap().is_empty());

    // Deleting the owner deletes the board and its tasks
    User::delete(&pool, owner.id).await.unwrap();
    assert!(Board::find_by_id(&pool, board.id).await.unwrap().is_none());
    assert!(Task::find_by_id(&pool, task.id).await.unwrap().is_none());
}
