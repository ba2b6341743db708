//! HTTP 中间件与应用状态
//! 请求追踪（trace_id / request_id / 指标）

use crate::{
    auth::{AuthGate, HashOptions, JwtService, PasswordHasher},
    config::AppConfig,
    error::AppError,
    repository::{ProjectRepository, ProjectStore, UserFinder, UserRepository, UserStore},
    services::{AuthService, PermissionService},
};
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 应用状态
///
/// 服务使用 Arc 包装，多个请求共享同一实例，Clone 只是指针拷贝。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: PgPool,
    pub jwt_service: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub permission_service: Arc<PermissionService>,
    pub auth_gate: Arc<AuthGate>,
    pub started_at: Instant,
}

impl AppState {
    /// 基于 PostgreSQL 仓储构建
    pub fn new(config: AppConfig, db: PgPool) -> Result<Self, AppError> {
        let users = Arc::new(UserRepository::new(db.clone()));
        let projects: Arc<dyn ProjectStore> = Arc::new(ProjectRepository::new(db.clone()));

        Self::with_stores(config, db, users, projects)
    }

    /// 注入用户与项目存储（测试中使用内存实现）
    pub fn with_stores<U>(
        config: AppConfig,
        db: PgPool,
        users: Arc<U>,
        projects: Arc<dyn ProjectStore>,
    ) -> Result<Self, AppError>
    where
        U: UserStore + 'static,
    {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let hasher = PasswordHasher::new(HashOptions::from(&config.hashing))
            .map_err(|e| AppError::Config(e.to_string()))?;

        let finder: Arc<dyn UserFinder> = users.clone();
        let store: Arc<dyn UserStore> = users;

        let auth_service = Arc::new(AuthService::new(
            store,
            jwt_service.clone(),
            hasher,
            config.security.password_min_length,
        ));
        let permission_service = Arc::new(PermissionService::new(projects, finder.clone()));
        let auth_gate = Arc::new(AuthGate::new(jwt_service.clone(), finder));

        Ok(Self {
            config,
            db,
            jwt_service,
            auth_service,
            permission_service,
            auth_gate,
            started_at: Instant::now(),
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
        user_id = tracing::field::Empty,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!(
            "http_requests_total",
            "method" => method.to_string(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中回写 trace_id / request_id
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
