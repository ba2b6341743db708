//! Notification repository

use crate::{error::AppError, models::notification::Notification};
use sqlx::PgPool;

pub struct NotificationRepository {
    db: PgPool,
}

impl NotificationRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        owner_id: i64,
        title: &str,
        description: &str,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (owner_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(title)
        .bind(description)
        .fetch_one(&self.db)
        .await?;

        Ok(notification)
    }

    /// 最新的在前
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE owner_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        Ok(notifications)
    }

    /// 只有所有者能标记已读，否则返回 `None`
    pub async fn mark_read(&self, id: i64, owner_id: i64) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE, updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(notification)
    }
}
