//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{
    auth::auth_gate_middleware,
    handlers,
    middleware::{request_tracking_middleware, AppState},
};

/// 请求体大小上限
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需认证）
    let auth_routes = Router::new()
        .route("/api/v1/user/create", post(handlers::user::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/refresh", post(handlers::auth::refresh))
        .route("/api/v1/auth/logout", post(handlers::auth::logout));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        // 当前用户
        .route("/api/v1/user/me", get(handlers::user::me))
        .route("/api/v1/user/update", put(handlers::user::update_me))
        .route("/api/v1/user/password", put(handlers::user::change_password))
        .route("/api/v1/user/delete", delete(handlers::user::delete_me))
        .route("/api/v1/user/{user_id}/tasks", get(handlers::task::list_by_user))

        // 项目
        .route("/api/v1/project", post(handlers::project::create_project))
        .route(
            "/api/v1/project/{id}",
            get(handlers::project::get_project)
                .put(handlers::project::update_project)
                .delete(handlers::project::delete_project),
        )
        .route("/api/v1/user_projects", get(handlers::project::list_owned))
        .route("/api/v1/user_shared_projects", get(handlers::project::list_shared))
        .route(
            "/api/v1/project_subprojects/{parent_project_id}",
            get(handlers::project::list_subprojects),
        )

        // 项目成员
        .route(
            "/api/v1/project_users/{project_id}",
            get(handlers::project::list_members),
        )
        .route(
            "/api/v1/project_users/{project_id}/invite",
            post(handlers::project::invite),
        )
        .route(
            "/api/v1/project_users/{project_id}/permissions/{user_id}",
            get(handlers::project::get_permission),
        )
        .route(
            "/api/v1/project_users/{project_id}/accept",
            post(handlers::project::accept),
        )

        // 看板
        .route("/api/v1/kanban", post(handlers::kanban::create_kanban))
        .route(
            "/api/v1/kanban/{id}",
            get(handlers::kanban::get_kanban)
                .put(handlers::kanban::update_kanban)
                .delete(handlers::kanban::delete_kanban),
        )
        .route(
            "/api/v1/kanban/project/{project_id}",
            get(handlers::kanban::list_by_project),
        )

        // 任务
        .route("/api/v1/task", post(handlers::task::create_task))
        .route(
            "/api/v1/task/{id}",
            get(handlers::task::get_task)
                .put(handlers::task::update_task)
                .delete(handlers::task::delete_task),
        )
        .route("/api/v1/task/{id}/assign", post(handlers::task::assign_task))
        .route("/api/v1/kanban_tasks/{kanban_id}", get(handlers::task::list_by_kanban))
        .route("/api/v1/project_tasks/{project_id}", get(handlers::task::list_by_project))

        // 评论
        .route("/api/v1/comment/forTask", post(handlers::comment::create_comment))
        .route(
            "/api/v1/comment/forTask/{task_id}",
            get(handlers::comment::list_for_task),
        )

        // 通知
        .route(
            "/api/v1/notification",
            get(handlers::notification::list_notifications)
                .post(handlers::notification::create_notification),
        )
        .route(
            "/api/v1/notification/{id}/read",
            post(handlers::notification::mark_read),
        )
        .route_layer(middleware::from_fn_with_state(
            state.auth_gate.clone(),
            auth_gate_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors_layer(&state.config.server.allow_origins))
        .layer(middleware::from_fn(request_tracking_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS：允许携带 cookie，来源必须显式配置
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
