//! Project and membership models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Permission that grants invite rights besides ownership
pub const PERMISSION_ADMIN: &str = "admin";

/// Read-only permission; everything else may write
pub const PERMISSION_VIEWER: &str = "viewer";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
    pub parent_project_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of `project_users`. `joined_at == None` is a pending invitation.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectMember {
    pub project_id: i64,
    pub user_id: i64,
    pub permission: String,
    pub invited_by_user_id: Option<i64>,
    pub invited_at: DateTime<Utc>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl ProjectMember {
    pub fn is_pending(&self) -> bool {
        self.joined_at.is_none()
    }

    pub fn can_write(&self) -> bool {
        !self.is_pending() && self.permission != PERMISSION_VIEWER
    }
}

/// Member listing joined with the user's public fields
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProjectMemberView {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub permission: String,
    pub invited_at: DateTime<Utc>,
    pub joined_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    pub parent_project_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(email(message = "invalid email"))]
    pub user_email: String,
    #[validate(length(min = 1, max = 32, message = "permission is required"))]
    pub permission: String,
}
