//! JWT token generation and validation
//! Implements access token + refresh token pattern

use crate::{config::AppConfig, error::AppError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Clock skew tolerated when checking `exp`, in seconds.
pub const LEEWAY_SECS: u64 = 60;

/// The only algorithm tokens are signed and accepted with.
const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("jwt signing error")]
    Signing,

    #[error("invalid jwt")]
    Invalid,

    #[error("jwt token expired")]
    Expired,

    #[error("invalid refresh token")]
    InvalidRefreshToken,
}

/// Token kind, carried in the `sub` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,

    pub user_email: String,

    /// Token kind discriminator
    pub sub: TokenKind,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,
}

/// Token pair issued at login, registration and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp at which the access token expires
    pub expires_at: i64,
}

/// JWT service
///
/// Holds the process-wide signing key; read-only after construction and
/// shared across requests behind an `Arc`.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = LEEWAY_SECS;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self::new(
            secret.as_bytes(),
            Duration::seconds(config.security.access_token_exp_secs as i64),
            Duration::seconds(config.security.refresh_token_exp_secs as i64),
        ))
    }

    /// Sign a single token. `ttl` may be negative, which yields an
    /// already-expired token.
    pub fn issue(
        &self,
        user_id: i64,
        user_email: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();

        let claims = Claims {
            user_id,
            user_email: user_email.to_string(),
            sub: kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode {:?} token: {:?}", kind, e);
            TokenError::Signing
        })
    }

    /// Issue an access/refresh pair with the configured lifetimes
    pub fn create_pair(&self, user_id: i64, user_email: &str) -> Result<TokenPair, TokenError> {
        self.create_pair_with_ttl(user_id, user_email, self.access_ttl, self.refresh_ttl)
    }

    pub fn create_pair_with_ttl(
        &self,
        user_id: i64,
        user_email: &str,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<TokenPair, TokenError> {
        let access_token = self.issue(user_id, user_email, TokenKind::Access, access_ttl)?;
        let refresh_token = self.issue(user_id, user_email, TokenKind::Refresh, refresh_ttl)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_at: (Utc::now() + access_ttl).timestamp(),
        })
    }

    /// Validate signature, algorithm and expiry of any token kind.
    ///
    /// An expired token yields [`TokenError::Expired`]; every other failure
    /// collapses into [`TokenError::Invalid`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    TokenError::Expired
                }
                _ => {
                    tracing::debug!("Token validation failed: {:?}", e);
                    TokenError::Invalid
                }
            })?
            .claims;

        // A negative TTL can land inside the leeway window; that is still expiry
        if claims.exp <= claims.iat {
            if claims.exp < Utc::now().timestamp() {
                tracing::debug!("Token expired within leeway");
                return Err(TokenError::Expired);
            }
            tracing::debug!("Token expiry precedes issue time");
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }

    /// Validate access token specifically
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;

        if claims.sub != TokenKind::Access {
            tracing::debug!("Token kind mismatch: expected access, got {:?}", claims.sub);
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }

    /// Exchange a refresh token for a brand-new pair
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        self.refresh_with_ttl(refresh_token, self.access_ttl)
    }

    pub fn refresh_with_ttl(
        &self,
        refresh_token: &str,
        access_ttl: Duration,
    ) -> Result<TokenPair, TokenError> {
        let claims = self.verify(refresh_token)?;

        if claims.sub != TokenKind::Refresh {
            tracing::debug!("Access token presented as refresh token");
            return Err(TokenError::InvalidRefreshToken);
        }

        self.create_pair_with_ttl(claims.user_id, &claims.user_email, access_ttl, self.refresh_ttl)
    }
}
