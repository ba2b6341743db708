//! 评论处理器

use crate::{
    auth::middleware::AuthContext,
    error::{ApiResponse, AppError},
    handlers::extract::{Json, Path},
    middleware::AppState,
    models::comment::{Comment, CreateCommentRequest},
    repository::{CommentRepository, NotificationRepository, TaskRepository},
};
use axum::{extract::State, http::StatusCode};
use std::sync::Arc;
use validator::Validate;

async fn project_of_task(state: &AppState, task_id: i64) -> Result<i64, AppError> {
    TaskRepository::new(state.db.clone())
        .project_id_of(task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".to_string()))
}

/// 发表评论，同时在作者的通知流中记录 "<email>: <text>"
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, ApiResponse<Comment>), AppError> {
    req.validate()?;

    let project_id = project_of_task(&state, req.task_id).await?;
    state
        .permission_service
        .require_write(project_id, auth.user_id)
        .await?;

    let comment = CommentRepository::new(state.db.clone())
        .create(req.task_id, auth.user_id, &req.text)
        .await?;

    let title = format!("{}: {}", auth.email, req.text);
    if let Err(e) = NotificationRepository::new(state.db.clone())
        .create(auth.user_id, &title, "")
        .await
    {
        tracing::warn!(comment_id = comment.id, error = %e, "Failed to create comment notification");
    }

    Ok((StatusCode::CREATED, ApiResponse::ok(comment)))
}

pub async fn list_for_task(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(task_id): Path<i64>,
) -> Result<ApiResponse<Vec<Comment>>, AppError> {
    let project_id = project_of_task(&state, task_id).await?;
    state
        .permission_service
        .require_read(project_id, auth.user_id)
        .await?;

    let comments = CommentRepository::new(state.db.clone())
        .list_by_task(task_id)
        .await?;
    Ok(ApiResponse::ok(comments))
}
