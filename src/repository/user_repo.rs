//! User repository (数据库访问层)

use crate::{
    error::AppError,
    models::user::{NewUser, UpdateUserRequest, User},
};
use async_trait::async_trait;
use sqlx::PgPool;

/// 用户查询能力（认证网关、权限模型只依赖这一层）
#[async_trait]
pub trait UserFinder: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;
}

/// 用户读写能力
#[async_trait]
pub trait UserStore: UserFinder {
    /// 邮箱重复时返回 `AppError::Conflict`
    async fn create(&self, user: &NewUser) -> Result<User, AppError>;

    async fn update(&self, id: i64, req: &UpdateUserRequest) -> Result<Option<User>, AppError>;

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// 唯一约束冲突转换为 409
fn map_unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("user with this email already exists".to_string())
        }
        _ => AppError::Database(e),
    }
}

#[async_trait]
impl UserFinder for UserRepository {
    /// 根据邮箱查找用户
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, surname, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_unique_violation)
    }

    async fn update(&self, id: i64, req: &UpdateUserRequest) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                surname = COALESCE($3, surname),
                email = COALESCE($4, email),
                avatar_url = COALESCE($5, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.surname)
        .bind(&req.email)
        .bind(&req.avatar_url)
        .fetch_optional(&self.db)
        .await
        .map_err(map_unique_violation)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
