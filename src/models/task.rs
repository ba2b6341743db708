//! Task models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub kanban_id: i64,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    pub kanban_id: i64,
    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
    /// Move the task to another board of the same project
    pub kanban_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    pub user_id: i64,
}
