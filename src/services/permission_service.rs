//! 项目权限模型
//!
//! 项目所有者隐式拥有全部权限；其他用户通过 project_users 记录获得权限。
//! 邀请在被接受（joined_at 非空）之前只可查询，不授予任何访问权。

use crate::{
    error::AppError,
    models::project::{Project, ProjectMember, PERMISSION_ADMIN},
    repository::{ProjectStore, UserFinder},
};
use std::sync::Arc;

/// 用户在项目中的身份
#[derive(Debug, Clone)]
pub enum ProjectRole {
    Owner,
    Member(ProjectMember),
    Pending(ProjectMember),
    Outsider,
}

impl ProjectRole {
    pub fn can_read(&self) -> bool {
        matches!(self, ProjectRole::Owner | ProjectRole::Member(_))
    }

    pub fn can_write(&self) -> bool {
        match self {
            ProjectRole::Owner => true,
            ProjectRole::Member(member) => member.can_write(),
            _ => false,
        }
    }

    pub fn can_invite(&self) -> bool {
        match self {
            ProjectRole::Owner => true,
            ProjectRole::Member(member) => member.permission == PERMISSION_ADMIN,
            _ => false,
        }
    }
}

pub struct PermissionService {
    projects: Arc<dyn ProjectStore>,
    users: Arc<dyn UserFinder>,
}

impl PermissionService {
    pub fn new(projects: Arc<dyn ProjectStore>, users: Arc<dyn UserFinder>) -> Self {
        Self { projects, users }
    }

    async fn load_project(&self, project_id: i64) -> Result<Project, AppError> {
        self.projects
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("project not found".to_string()))
    }

    async fn role_in(&self, project: &Project, user_id: i64) -> Result<ProjectRole, AppError> {
        if project.owner_id == user_id {
            return Ok(ProjectRole::Owner);
        }

        let role = match self.projects.find_membership(project.id, user_id).await? {
            Some(member) if member.is_pending() => ProjectRole::Pending(member),
            Some(member) => ProjectRole::Member(member),
            None => ProjectRole::Outsider,
        };

        Ok(role)
    }

    /// 用户在项目中的身份；项目不存在时返回 404
    pub async fn role(&self, project_id: i64, user_id: i64) -> Result<ProjectRole, AppError> {
        let project = self.load_project(project_id).await?;
        self.role_in(&project, user_id).await
    }

    /// 要求读权限（所有者或已接受邀请的成员）
    pub async fn require_read(&self, project_id: i64, user_id: i64) -> Result<Project, AppError> {
        let project = self.load_project(project_id).await?;

        if !self.role_in(&project, user_id).await?.can_read() {
            tracing::debug!(project_id, user_id, "Read access denied");
            return Err(AppError::Forbidden(format!(
                "user has no access to project {}",
                project_id
            )));
        }

        Ok(project)
    }

    /// 要求写权限（所有者或非只读的已接受成员）
    pub async fn require_write(&self, project_id: i64, user_id: i64) -> Result<Project, AppError> {
        let project = self.load_project(project_id).await?;

        if !self.role_in(&project, user_id).await?.can_write() {
            tracing::debug!(project_id, user_id, "Write access denied");
            return Err(AppError::Forbidden(format!(
                "user has no write access to project {}",
                project_id
            )));
        }

        Ok(project)
    }

    /// 要求是项目所有者
    pub async fn require_owner(&self, project_id: i64, user_id: i64) -> Result<Project, AppError> {
        let project = self.load_project(project_id).await?;

        if project.owner_id != user_id {
            return Err(AppError::Forbidden(format!(
                "user is not the owner of project {}",
                project_id
            )));
        }

        Ok(project)
    }

    /// 邀请用户加入项目，生成待接受的成员记录
    pub async fn invite(
        &self,
        project_id: i64,
        invitee_email: &str,
        permission: &str,
        inviter_user_id: i64,
    ) -> Result<ProjectMember, AppError> {
        let permission = permission.trim();
        if permission.is_empty() {
            return Err(AppError::BadRequest("permission is required".to_string()));
        }

        let project = self.load_project(project_id).await?;

        if !self.role_in(&project, inviter_user_id).await?.can_invite() {
            return Err(AppError::Forbidden(format!(
                "user cannot invite to project {}",
                project_id
            )));
        }

        let invitee = self
            .users
            .find_by_email(&invitee_email.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        if invitee.id == project.owner_id {
            return Err(AppError::BadRequest(
                "project owner cannot be invited".to_string(),
            ));
        }

        let member = self
            .projects
            .insert_invitation(project_id, invitee.id, permission, inviter_user_id)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("user is already a member of this project".to_string())
            })?;

        tracing::info!(
            project_id,
            invitee_id = invitee.id,
            inviter_id = inviter_user_id,
            permission,
            "User invited to project"
        );

        Ok(member)
    }

    /// 查询成员记录中的权限；不在项目中返回 `None`（待接受的邀请也会返回）
    pub async fn get_permission(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<Option<String>, AppError> {
        let member = self.projects.find_membership(project_id, user_id).await?;
        Ok(member.map(|m| m.permission))
    }

    /// 接受邀请；重复接受只会刷新 joined_at
    pub async fn accept(&self, project_id: i64, user_id: i64) -> Result<ProjectMember, AppError> {
        let member = self
            .projects
            .mark_joined(project_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("invitation not found".to_string()))?;

        tracing::info!(project_id, user_id, "Project invitation accepted");
        Ok(member)
    }

    /// 删除项目，仅所有者可操作
    pub async fn delete_project(&self, project_id: i64, user_id: i64) -> Result<(), AppError> {
        self.require_owner(project_id, user_id).await?;

        if !self.projects.delete_project(project_id).await? {
            return Err(AppError::NotFound("project not found".to_string()));
        }

        tracing::info!(project_id, user_id, "Project deleted");
        Ok(())
    }
}
