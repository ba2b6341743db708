//! 看板处理器

use crate::{
    auth::middleware::AuthContext,
    error::{ApiResponse, AppError},
    handlers::extract::{Json, Path},
    middleware::AppState,
    models::kanban::{CreateKanbanRequest, Kanban, UpdateKanbanRequest},
    repository::KanbanRepository,
};
use axum::{extract::State, http::StatusCode};
use std::sync::Arc;
use validator::Validate;

async fn load_kanban(repo: &KanbanRepository, id: i64) -> Result<Kanban, AppError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("kanban not found".to_string()))
}

pub async fn create_kanban(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateKanbanRequest>,
) -> Result<(StatusCode, ApiResponse<Kanban>), AppError> {
    req.validate()?;

    state
        .permission_service
        .require_write(req.project_id, auth.user_id)
        .await?;

    let kanban = KanbanRepository::new(state.db.clone())
        .create(req.project_id, req.name.trim())
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(kanban)))
}

pub async fn get_kanban(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Kanban>, AppError> {
    let kanban = load_kanban(&KanbanRepository::new(state.db.clone()), id).await?;

    state
        .permission_service
        .require_read(kanban.project_id, auth.user_id)
        .await?;

    Ok(ApiResponse::ok(kanban))
}

pub async fn update_kanban(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateKanbanRequest>,
) -> Result<ApiResponse<Kanban>, AppError> {
    req.validate()?;

    let repo = KanbanRepository::new(state.db.clone());
    let kanban = load_kanban(&repo, id).await?;

    state
        .permission_service
        .require_write(kanban.project_id, auth.user_id)
        .await?;

    let kanban = repo
        .rename(id, req.name.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("kanban not found".to_string()))?;

    Ok(ApiResponse::ok(kanban))
}

pub async fn delete_kanban(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, AppError> {
    let repo = KanbanRepository::new(state.db.clone());
    let kanban = load_kanban(&repo, id).await?;

    state
        .permission_service
        .require_write(kanban.project_id, auth.user_id)
        .await?;

    repo.delete(id).await?;
    Ok(ApiResponse::empty())
}

pub async fn list_by_project(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(project_id): Path<i64>,
) -> Result<ApiResponse<Vec<Kanban>>, AppError> {
    state
        .permission_service
        .require_read(project_id, auth.user_id)
        .await?;

    let kanbans = KanbanRepository::new(state.db.clone())
        .list_by_project(project_id)
        .await?;
    Ok(ApiResponse::ok(kanbans))
}
