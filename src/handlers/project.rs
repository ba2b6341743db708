//! 项目与成员关系的 HTTP 处理器

use crate::{
    auth::middleware::AuthContext,
    error::{ApiResponse, AppError},
    handlers::extract::{Json, Path},
    middleware::AppState,
    models::project::{
        CreateProjectRequest, InviteRequest, Project, ProjectMember, ProjectMemberView,
        UpdateProjectRequest,
    },
    repository::{NotificationRepository, ProjectRepository},
};
use axum::{extract::State, http::StatusCode};
use std::sync::Arc;
use validator::Validate;

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, ApiResponse<Project>), AppError> {
    req.validate()?;

    // 子项目需要对父项目有写权限
    if let Some(parent_id) = req.parent_project_id {
        state
            .permission_service
            .require_write(parent_id, auth.user_id)
            .await?;
    }

    let project = ProjectRepository::new(state.db.clone())
        .create(auth.user_id, &req)
        .await?;

    tracing::info!(project_id = project.id, owner_id = auth.user_id, "Project created");

    Ok((StatusCode::CREATED, ApiResponse::ok(project)))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<ApiResponse<Project>, AppError> {
    let project = state.permission_service.require_read(id, auth.user_id).await?;
    Ok(ApiResponse::ok(project))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<ApiResponse<Project>, AppError> {
    req.validate()?;

    state.permission_service.require_write(id, auth.user_id).await?;

    let project = ProjectRepository::new(state.db.clone())
        .update(id, &req)
        .await?
        .ok_or_else(|| AppError::NotFound("project not found".to_string()))?;

    Ok(ApiResponse::ok(project))
}

pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<i64>,
) -> Result<ApiResponse<()>, AppError> {
    state.permission_service.delete_project(id, auth.user_id).await?;
    Ok(ApiResponse::empty())
}

/// 当前用户拥有的项目
pub async fn list_owned(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<ApiResponse<Vec<Project>>, AppError> {
    let projects = ProjectRepository::new(state.db.clone())
        .list_owned(auth.user_id)
        .await?;
    Ok(ApiResponse::ok(projects))
}

/// 当前用户已加入的共享项目
pub async fn list_shared(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Result<ApiResponse<Vec<Project>>, AppError> {
    let projects = ProjectRepository::new(state.db.clone())
        .list_shared(auth.user_id)
        .await?;
    Ok(ApiResponse::ok(projects))
}

pub async fn list_subprojects(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(parent_id): Path<i64>,
) -> Result<ApiResponse<Vec<Project>>, AppError> {
    state
        .permission_service
        .require_read(parent_id, auth.user_id)
        .await?;

    let projects = ProjectRepository::new(state.db.clone())
        .list_subprojects(parent_id)
        .await?;
    Ok(ApiResponse::ok(projects))
}

/// 邀请用户，并给被邀请人发送通知
pub async fn invite(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(project_id): Path<i64>,
    Json(req): Json<InviteRequest>,
) -> Result<(StatusCode, ApiResponse<ProjectMember>), AppError> {
    req.validate()?;

    let member = state
        .permission_service
        .invite(project_id, &req.user_email, &req.permission, auth.user_id)
        .await?;

    // 通知失败不影响邀请结果
    let description = format!("{} invited you to project {}", auth.email, project_id);
    if let Err(e) = NotificationRepository::new(state.db.clone())
        .create(member.user_id, "Project invitation", &description)
        .await
    {
        tracing::warn!(
            project_id,
            invitee_id = member.user_id,
            error = %e,
            "Failed to create invitation notification"
        );
    }

    Ok((StatusCode::CREATED, ApiResponse::ok(member)))
}

/// 查询成员权限；不在项目中返回 404
pub async fn get_permission(
    State(state): State<Arc<AppState>>,
    _auth: AuthContext,
    Path((project_id, user_id)): Path<(i64, i64)>,
) -> Result<ApiResponse<String>, AppError> {
    let permission = state
        .permission_service
        .get_permission(project_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user is not in project".to_string()))?;

    Ok(ApiResponse::ok(permission))
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(project_id): Path<i64>,
) -> Result<ApiResponse<Vec<ProjectMemberView>>, AppError> {
    state
        .permission_service
        .require_read(project_id, auth.user_id)
        .await?;

    let members = ProjectRepository::new(state.db.clone())
        .list_members(project_id)
        .await?;
    Ok(ApiResponse::ok(members))
}

/// 当前用户接受邀请
pub async fn accept(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(project_id): Path<i64>,
) -> Result<ApiResponse<ProjectMember>, AppError> {
    let member = state
        .permission_service
        .accept(project_id, auth.user_id)
        .await?;
    Ok(ApiResponse::ok(member))
}
