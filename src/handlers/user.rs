//! 用户相关的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::{ApiResponse, AppError},
    handlers::{auth::issue_session, extract::Json},
    middleware::AppState,
    models::{
        auth::AccessTokenResponse,
        user::{ChangePasswordRequest, CreateUserRequest, UpdateUserRequest, UserResponse},
    },
};
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use validator::Validate;

/// 注册
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<CreateUserRequest>,
) -> Result<(CookieJar, ApiResponse<AccessTokenResponse>), AppError> {
    req.validate()?;

    let (_, tokens) = state.auth_service.register(req).await?;
    Ok(issue_session(&state, jar, tokens))
}

/// 当前用户
pub async fn me(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<ApiResponse<UserResponse>, AppError> {
    let user = state.auth_service.current_user(auth.user_id).await?;
    Ok(ApiResponse::ok(user.into()))
}

pub async fn update_me(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<UpdateUserRequest>,
) -> Result<ApiResponse<UserResponse>, AppError> {
    req.validate()?;

    let user = state.auth_service.update_profile(auth.user_id, req).await?;
    Ok(ApiResponse::ok(user.into()))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    req.validate()?;

    state.auth_service.change_password(auth.user_id, req).await?;
    Ok(ApiResponse::empty())
}

pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<ApiResponse<()>, AppError> {
    state.auth_service.delete_account(auth.user_id).await?;
    Ok(ApiResponse::empty())
}
