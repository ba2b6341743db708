//! 认证网关中间件
//!
//! 受保护路由的每个请求依次检查：Authorization 头、refresh_token cookie、
//! 访问令牌签名与有效期、令牌中的邮箱能否解析到同一 user_id 的用户。任何一步失败都直接返回 401，
//! 后续 handler 不会执行。

use crate::{
    auth::{cookie::REFRESH_COOKIE, jwt::JwtService},
    error::AppError,
    repository::UserFinder,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

pub const EMPTY_AUTH_HEADER: &str = "Authorization header is empty";
pub const EMPTY_REFRESH_COOKIE: &str = "refresh_token cookie is empty";

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
    pub email: String,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("missing auth context".to_string()))
    }
}

/// 认证网关依赖：令牌编解码器 + 用户查询能力
pub struct AuthGate {
    jwt: Arc<JwtService>,
    users: Arc<dyn UserFinder>,
}

impl AuthGate {
    pub fn new(jwt: Arc<JwtService>, users: Arc<dyn UserFinder>) -> Self {
        Self { jwt, users }
    }

    /// 按顺序执行全部检查，成功时返回认证上下文
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AppError> {
        let token = extract_token(headers)
            .ok_or_else(|| AppError::Unauthorized(EMPTY_AUTH_HEADER.to_string()))?;

        // 只检查存在性，refresh 令牌在 /auth/refresh 处才校验
        if extract_refresh_cookie(headers).is_none() {
            return Err(AppError::Unauthorized(EMPTY_REFRESH_COOKIE.to_string()));
        }

        let claims = self.jwt.verify_access(&token)?;

        let user = self
            .users
            .find_by_email(&claims.user_email)
            .await?
            .filter(|user| user.id == claims.user_id)
            .ok_or_else(|| {
                tracing::debug!(email = %claims.user_email, "Token subject no longer exists");
                AppError::Unauthorized("user not found".to_string())
            })?;

        Ok(AuthContext {
            user_id: user.id,
            email: user.email,
        })
    }
}

/// 从 Authorization 头提取令牌，可带 `Bearer ` 前缀
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();

    (!token.is_empty()).then(|| token.to_string())
}

/// 读取非空的 refresh_token cookie
pub fn extract_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// 认证网关中间件 - 必须认证
pub async fn auth_gate_middleware(
    State(gate): State<Arc<AuthGate>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_context = gate.authenticate(req.headers()).await?;

    tracing::Span::current().record("user_id", auth_context.user_id);

    // 附加到请求扩展
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
