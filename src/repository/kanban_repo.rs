//! Kanban repository

use crate::{error::AppError, models::kanban::Kanban};
use sqlx::PgPool;

pub struct KanbanRepository {
    db: PgPool,
}

impl KanbanRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, project_id: i64, name: &str) -> Result<Kanban, AppError> {
        let kanban = sqlx::query_as::<_, Kanban>(
            "INSERT INTO kanbans (project_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(project_id)
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        Ok(kanban)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Kanban>, AppError> {
        let kanban = sqlx::query_as::<_, Kanban>("SELECT * FROM kanbans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(kanban)
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<Option<Kanban>, AppError> {
        let kanban = sqlx::query_as::<_, Kanban>(
            "UPDATE kanbans SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(kanban)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM kanbans WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_project(&self, project_id: i64) -> Result<Vec<Kanban>, AppError> {
        let kanbans = sqlx::query_as::<_, Kanban>(
            "SELECT * FROM kanbans WHERE project_id = $1 ORDER BY created_at",
        )
        .bind(project_id)
        .fetch_all(&self.db)
        .await?;

        Ok(kanbans)
    }
}
