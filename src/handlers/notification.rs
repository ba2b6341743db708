//! 通知处理器

use crate::{
    auth::middleware::AuthContext,
    error::{ApiResponse, AppError},
    handlers::extract::{Json, Path},
    middleware::AppState,
    models::notification::{CreateNotificationRequest, Notification},
    repository::NotificationRepository,
};
use axum::{extract::State, http::StatusCode};
use std::sync::Arc;
use validator::Validate;

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<ApiResponse<Vec<Notification>>, AppError> {
    let notifications = NotificationRepository::new(state.db.clone())
        .list_by_owner(auth.user_id)
        .await?;
    Ok(ApiResponse::ok(notifications))
}

pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, ApiResponse<Notification>), AppError> {
    req.validate()?;

    let notification = NotificationRepository::new(state.db.clone())
        .create(auth.user_id, &req.title, &req.description)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(notification)))
}

/// 标记已读；不属于当前用户的通知按不存在处理
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Notification>, AppError> {
    let notification = NotificationRepository::new(state.db.clone())
        .mark_read(id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("notification not found".to_string()))?;
    Ok(ApiResponse::ok(notification))
}
