//! 认证服务：注册、登录、令牌刷新、账户维护

use crate::{
    auth::{
        jwt::{JwtService, TokenKind, TokenPair},
        password::{validate_password_policy, PasswordHasher},
        TokenError,
    },
    error::AppError,
    models::{
        auth::LoginRequest,
        user::{ChangePasswordRequest, CreateUserRequest, NewUser, UpdateUserRequest, User},
    },
    repository::UserStore,
};
use std::sync::Arc;

pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
    password_min_length: usize,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        jwt_service: Arc<JwtService>,
        hasher: PasswordHasher,
        password_min_length: usize,
    ) -> Self {
        Self {
            users,
            jwt_service,
            hasher,
            password_min_length,
        }
    }

    // Argon2 占用 CPU 与内存，放到阻塞线程池执行
    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let encoded = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;

        Ok(encoded)
    }

    async fn verify_password(&self, password: String, encoded: String) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &encoded))
            .await
            .map_err(|e| AppError::Internal(format!("hashing task failed: {}", e)))??;

        Ok(matches)
    }

    fn check_policy(&self, password: &str) -> Result<(), AppError> {
        validate_password_policy(password, self.password_min_length).map_err(AppError::BadRequest)
    }

    /// 用户注册，成功后直接签发令牌
    pub async fn register(&self, req: CreateUserRequest) -> Result<(User, TokenPair), AppError> {
        self.check_policy(&req.password)?;

        let password_hash = self.hash_password(req.password).await?;

        let user = self
            .users
            .create(&NewUser {
                name: req.name.trim().to_string(),
                surname: req.surname.trim().to_string(),
                email: normalize_email(&req.email),
                password_hash,
            })
            .await?;

        let tokens = self.jwt_service.create_pair(user.id, &user.email)?;

        tracing::info!(user_id = user.id, "User registered");

        Ok((user, tokens))
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<(User, TokenPair), AppError> {
        let user = self
            .users
            .find_by_email(&normalize_email(&req.email))
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        if !self
            .verify_password(req.password, user.password_hash.clone())
            .await?
        {
            tracing::debug!(user_id = user.id, "Login with wrong password");
            return Err(AppError::BadRequest("incorrect auth data".to_string()));
        }

        let tokens = self.jwt_service.create_pair(user.id, &user.email)?;

        tracing::info!(user_id = user.id, "User logged in");

        Ok((user, tokens))
    }

    /// 用 refresh 令牌换取新的令牌对
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.jwt_service.verify(refresh_token)?;
        if claims.sub != TokenKind::Refresh {
            return Err(TokenError::InvalidRefreshToken.into());
        }

        // 邮箱已变更的令牌不再续期
        let user = self.users.find_by_id(claims.user_id).await?;
        if !user.is_some_and(|u| u.email == claims.user_email) {
            tracing::debug!(user_id = claims.user_id, "Refresh token subject no longer matches");
            return Err(AppError::Unauthorized("user not found".to_string()));
        }

        Ok(self.jwt_service.refresh(refresh_token)?)
    }

    pub async fn current_user(&self, user_id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        mut req: UpdateUserRequest,
    ) -> Result<User, AppError> {
        req.email = req.email.as_deref().map(normalize_email);

        self.users
            .update(user_id, &req)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))
    }

    /// 修改密码，需要校验旧密码
    pub async fn change_password(
        &self,
        user_id: i64,
        req: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let user = self.current_user(user_id).await?;

        if !self.verify_password(req.old_password, user.password_hash).await? {
            return Err(AppError::BadRequest("incorrect auth data".to_string()));
        }

        self.check_policy(&req.new_password)?;
        let password_hash = self.hash_password(req.new_password).await?;

        if !self.users.update_password(user_id, &password_hash).await? {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        tracing::info!(user_id, "Password changed");
        Ok(())
    }

    pub async fn delete_account(&self, user_id: i64) -> Result<(), AppError> {
        if !self.users.delete(user_id).await? {
            return Err(AppError::NotFound("user not found".to_string()));
        }

        tracing::info!(user_id, "User deleted");
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
