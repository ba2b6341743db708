//! Comment repository

use crate::{error::AppError, models::comment::Comment};
use sqlx::PgPool;

pub struct CommentRepository {
    db: PgPool,
}

impl CommentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, task_id: i64, author_id: i64, text: &str) -> Result<Comment, AppError> {
        let comment = sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (task_id, author_id, text) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(task_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.db)
        .await?;

        Ok(comment)
    }

    pub async fn list_by_task(&self, task_id: i64) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM comments WHERE task_id = $1 ORDER BY created_at",
        )
        .bind(task_id)
        .fetch_all(&self.db)
        .await?;

        Ok(comments)
    }
}
