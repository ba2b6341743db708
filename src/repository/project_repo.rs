//! Project and membership repository

use crate::{
    error::AppError,
    models::project::{
        CreateProjectRequest, Project, ProjectMember, ProjectMemberView, UpdateProjectRequest,
    },
};
use async_trait::async_trait;
use sqlx::PgPool;

/// 项目与成员关系的存储能力（权限模型只依赖这一层）
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn find_project(&self, id: i64) -> Result<Option<Project>, AppError>;

    async fn delete_project(&self, id: i64) -> Result<bool, AppError>;

    async fn find_membership(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<Option<ProjectMember>, AppError>;

    /// 插入待接受的邀请；成员关系已存在时返回 `None`
    async fn insert_invitation(
        &self,
        project_id: i64,
        user_id: i64,
        permission: &str,
        invited_by_user_id: i64,
    ) -> Result<Option<ProjectMember>, AppError>;

    /// 设置 joined_at = NOW()；没有对应邀请时返回 `None`
    async fn mark_joined(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<Option<ProjectMember>, AppError>;
}

pub struct ProjectRepository {
    db: PgPool,
}

impl ProjectRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        owner_id: i64,
        req: &CreateProjectRequest,
    ) -> Result<Project, AppError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (owner_id, name, description, color, parent_project_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.color)
        .bind(req.parent_project_id)
        .fetch_one(&self.db)
        .await?;

        Ok(project)
    }

    pub async fn update(
        &self,
        id: i64,
        req: &UpdateProjectRequest,
    ) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                color = COALESCE($4, color),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.color)
        .fetch_optional(&self.db)
        .await?;

        Ok(project)
    }

    /// 用户拥有的项目
    pub async fn list_owned(&self, owner_id: i64) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(projects)
    }

    /// 用户已接受邀请的共享项目
    pub async fn list_shared(&self, user_id: i64) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.*
            FROM projects p
            INNER JOIN project_users pu ON pu.project_id = p.id
            WHERE pu.user_id = $1 AND pu.joined_at IS NOT NULL
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(projects)
    }

    pub async fn list_subprojects(&self, parent_id: i64) -> Result<Vec<Project>, AppError> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT * FROM projects WHERE parent_project_id = $1 ORDER BY created_at",
        )
        .bind(parent_id)
        .fetch_all(&self.db)
        .await?;

        Ok(projects)
    }

    pub async fn list_members(&self, project_id: i64) -> Result<Vec<ProjectMemberView>, AppError> {
        let members = sqlx::query_as::<_, ProjectMemberView>(
            r#"
            SELECT u.id AS user_id, u.email, u.name, u.surname,
                   pu.permission, pu.invited_at, pu.joined_at
            FROM project_users pu
            INNER JOIN users u ON u.id = pu.user_id
            WHERE pu.project_id = $1
            ORDER BY pu.invited_at
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(members)
    }
}

#[async_trait]
impl ProjectStore for ProjectRepository {
    async fn find_project(&self, id: i64) -> Result<Option<Project>, AppError> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(project)
    }

    async fn delete_project(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_membership(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<Option<ProjectMember>, AppError> {
        let member = sqlx::query_as::<_, ProjectMember>(
            "SELECT * FROM project_users WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(member)
    }

    async fn insert_invitation(
        &self,
        project_id: i64,
        user_id: i64,
        permission: &str,
        invited_by_user_id: i64,
    ) -> Result<Option<ProjectMember>, AppError> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            INSERT INTO project_users (project_id, user_id, permission, invited_by_user_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (project_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .bind(permission)
        .bind(invited_by_user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(member)
    }

    async fn mark_joined(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> Result<Option<ProjectMember>, AppError> {
        let member = sqlx::query_as::<_, ProjectMember>(
            r#"
            UPDATE project_users
            SET joined_at = NOW()
            WHERE project_id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(member)
    }
}
