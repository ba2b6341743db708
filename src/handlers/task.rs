//! 任务处理器

use crate::{
    auth::middleware::AuthContext,
    error::{ApiResponse, AppError},
    handlers::extract::{Json, Path},
    middleware::AppState,
    models::task::{AssignTaskRequest, CreateTaskRequest, Task, UpdateTaskRequest},
    repository::{KanbanRepository, TaskRepository},
};
use axum::{extract::State, http::StatusCode};
use std::sync::Arc;
use validator::Validate;

/// 任务所属项目，任务不存在时返回 404
async fn project_of_task(repo: &TaskRepository, task_id: i64) -> Result<i64, AppError> {
    repo.project_id_of(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".to_string()))
}

async fn project_of_kanban(state: &AppState, kanban_id: i64) -> Result<i64, AppError> {
    KanbanRepository::new(state.db.clone())
        .find_by_id(kanban_id)
        .await?
        .map(|k| k.project_id)
        .ok_or_else(|| AppError::NotFound("kanban not found".to_string()))
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, ApiResponse<Task>), AppError> {
    req.validate()?;

    let project_id = project_of_kanban(&state, req.kanban_id).await?;
    state
        .permission_service
        .require_write(project_id, auth.user_id)
        .await?;

    let task = TaskRepository::new(state.db.clone()).create(&req).await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(task)))
}

pub async fn get_task(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Task>, AppError> {
    let repo = TaskRepository::new(state.db.clone());
    let project_id = project_of_task(&repo, id).await?;

    state
        .permission_service
        .require_read(project_id, auth.user_id)
        .await?;

    let task = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".to_string()))?;

    Ok(ApiResponse::ok(task))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<ApiResponse<Task>, AppError> {
    req.validate()?;

    let repo = TaskRepository::new(state.db.clone());
    let project_id = project_of_task(&repo, id).await?;

    state
        .permission_service
        .require_write(project_id, auth.user_id)
        .await?;

    // 只能移动到同一项目的看板
    if let Some(kanban_id) = req.kanban_id {
        if project_of_kanban(&state, kanban_id).await? != project_id {
            return Err(AppError::BadRequest(
                "task can only be moved within its project".to_string(),
            ));
        }
    }

    let task = repo
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".to_string()))?;

    Ok(ApiResponse::ok(task))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, AppError> {
    let repo = TaskRepository::new(state.db.clone());
    let project_id = project_of_task(&repo, id).await?;

    state
        .permission_service
        .require_write(project_id, auth.user_id)
        .await?;

    repo.delete(id).await?;
    Ok(ApiResponse::empty())
}

/// 分配任务给项目成员
pub async fn assign_task(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<AssignTaskRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let repo = TaskRepository::new(state.db.clone());
    let project_id = project_of_task(&repo, id).await?;

    state
        .permission_service
        .require_write(project_id, auth.user_id)
        .await?;

    if !state
        .permission_service
        .role(project_id, req.user_id)
        .await?
        .can_read()
    {
        return Err(AppError::BadRequest(
            "assignee is not a member of the project".to_string(),
        ));
    }

    if !repo.assign(id, req.user_id).await? {
        return Err(AppError::Conflict("task is already assigned to this user".to_string()));
    }

    Ok(ApiResponse::empty())
}

pub async fn list_by_kanban(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(kanban_id): Path<i64>,
) -> Result<ApiResponse<Vec<Task>>, AppError> {
    let project_id = project_of_kanban(&state, kanban_id).await?;
    state
        .permission_service
        .require_read(project_id, auth.user_id)
        .await?;

    let tasks = TaskRepository::new(state.db.clone())
        .list_by_kanban(kanban_id)
        .await?;
    Ok(ApiResponse::ok(tasks))
}

pub async fn list_by_project(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(project_id): Path<i64>,
) -> Result<ApiResponse<Vec<Task>>, AppError> {
    state
        .permission_service
        .require_read(project_id, auth.user_id)
        .await?;

    let tasks = TaskRepository::new(state.db.clone())
        .list_by_project(project_id)
        .await?;
    Ok(ApiResponse::ok(tasks))
}

/// 分配给某个用户的任务，只能查看自己的
pub async fn list_by_user(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(user_id): Path<i64>,
) -> Result<ApiResponse<Vec<Task>>, AppError> {
    if user_id != auth.user_id {
        return Err(AppError::Forbidden(
            "cannot list tasks of another user".to_string(),
        ));
    }

    let tasks = TaskRepository::new(state.db.clone())
        .list_by_user(user_id)
        .await?;
    Ok(ApiResponse::ok(tasks))
}
