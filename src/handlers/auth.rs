//! 认证相关的 HTTP 处理器

use crate::{
    auth::{
        cookie::{clear_refresh_cookie, refresh_cookie},
        jwt::TokenPair,
        middleware::{extract_refresh_cookie, EMPTY_REFRESH_COOKIE},
    },
    error::{ApiResponse, AppError},
    handlers::extract::Json,
    middleware::AppState,
    models::auth::{AccessTokenResponse, LoginRequest},
};
use axum::{extract::State, http::HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use validator::Validate;

/// 将 refresh 令牌写入 cookie，只在响应体中返回 access 令牌
pub(crate) fn issue_session(
    state: &AppState,
    jar: CookieJar,
    tokens: TokenPair,
) -> (CookieJar, ApiResponse<AccessTokenResponse>) {
    let cookie = refresh_cookie(
        tokens.refresh_token,
        state.config.security.refresh_token_exp_secs as i64,
        state.config.security.cookie_secure,
    );

    (
        jar.add(cookie),
        ApiResponse::ok(AccessTokenResponse {
            access_token: tokens.access_token,
        }),
    )
}

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<AccessTokenResponse>), AppError> {
    req.validate()?;

    let (_, tokens) = state.auth_service.login(req).await?;

    Ok(issue_session(&state, jar, tokens))
}

/// 刷新令牌（读取 refresh_token cookie 并轮换）
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<AccessTokenResponse>), AppError> {
    let refresh_token = extract_refresh_cookie(&headers)
        .ok_or_else(|| AppError::Unauthorized(EMPTY_REFRESH_COOKIE.to_string()))?;

    let tokens = state.auth_service.refresh(&refresh_token).await?;

    Ok(issue_session(&state, jar, tokens))
}

/// 登出：令牌无状态，只清除 cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<()>) {
    (
        jar.add(clear_refresh_cookie(state.config.security.cookie_secure)),
        ApiResponse::empty(),
    )
}
