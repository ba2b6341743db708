//! Kanban board models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Kanban {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateKanbanRequest {
    pub project_id: i64,
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateKanbanRequest {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
}
