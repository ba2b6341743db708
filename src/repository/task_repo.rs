//! Task repository

use crate::{
    error::AppError,
    models::task::{CreateTaskRequest, Task, UpdateTaskRequest},
};
use sqlx::PgPool;

pub struct TaskRepository {
    db: PgPool,
}

impl TaskRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, req: &CreateTaskRequest) -> Result<Task, AppError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (kanban_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(req.kanban_id)
        .bind(&req.title)
        .bind(&req.description)
        .fetch_one(&self.db)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(task)
    }

    /// 任务所属项目
    pub async fn project_id_of(&self, task_id: i64) -> Result<Option<i64>, AppError> {
        let project_id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT k.project_id
            FROM tasks t
            INNER JOIN kanbans k ON k.id = t.kanban_id
            WHERE t.id = $1
            "#,
        )
        .bind(task_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(project_id)
    }

    pub async fn update(&self, id: i64, req: &UpdateTaskRequest) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                is_completed = COALESCE($4, is_completed),
                kanban_id = COALESCE($5, kanban_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.is_completed)
        .bind(req.kanban_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(task)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 分配任务；已分配时返回 false
    pub async fn assign(&self, task_id: i64, user_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO task_users (task_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (task_id, user_id) DO NOTHING
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_kanban(&self, kanban_id: i64) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE kanban_id = $1 ORDER BY created_at",
        )
        .bind(kanban_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tasks)
    }

    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT t.*
            FROM tasks t
            INNER JOIN task_users tu ON tu.task_id = t.id
            WHERE tu.user_id = $1
            ORDER BY t.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tasks)
    }

    pub async fn list_by_project(&self, project_id: i64) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT t.*
            FROM tasks t
            INNER JOIN kanbans k ON k.id = t.kanban_id
            WHERE k.project_id = $1
            ORDER BY t.created_at
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tasks)
    }
}
