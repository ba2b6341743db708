//! Password hashing and verification using Argon2id
//!
//! Hashes are stored in the PHC string format
//! (`$argon2id$v=19$m=65536,t=1,p=4$<salt>$<key>`), so the cost parameters
//! travel with every hash and tuning the defaults never invalidates stored
//! credentials.

use crate::config::HashingConfig;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;

/// Salt length in bytes, generated fresh for every hash.
pub const SALT_LEN: usize = 32;

/// Number of `$`-separated fields in an encoded hash (leading empty field included).
const ENCODED_FIELDS: usize = 6;

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("invalid hash format")]
    InvalidHashFormat,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashOptions {
    pub time_cost: u32,
    pub memory_kib: u32,
    pub parallelism: u32,
    pub key_len: usize,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            time_cost: 1,
            memory_kib: 64 * 1024,
            parallelism: 4,
            key_len: 32,
        }
    }
}

impl From<&HashingConfig> for HashOptions {
    fn from(config: &HashingConfig) -> Self {
        Self {
            time_cost: config.time_cost,
            memory_kib: config.memory_kib,
            parallelism: config.parallelism,
            key_len: config.key_len,
        }
    }
}

/// Password hasher with configurable parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(options: HashOptions) -> Result<Self, HashError> {
        let params = Params::new(
            options.memory_kib,
            options.time_cost,
            options.parallelism,
            Some(options.key_len),
        )
        .map_err(|e| HashError::Hashing(format!("invalid argon2 params: {}", e)))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        let mut salt_bytes = [0u8; SALT_LEN];
        OsRng.try_fill_bytes(&mut salt_bytes).map_err(|e| {
            tracing::error!("Entropy source failed: {:?}", e);
            HashError::Hashing(e.to_string())
        })?;

        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| HashError::Hashing(e.to_string()))?;

        let encoded = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                HashError::Hashing(e.to_string())
            })?
            .to_string();

        Ok(encoded)
    }

    /// Verify a password against an encoded hash.
    ///
    /// The key is re-derived with the parameters and salt parsed from
    /// `encoded` (not the hasher's own parameters) and compared in constant
    /// time. A mismatch is `Ok(false)`; only a malformed hash is an error.
    pub fn verify(&self, password: &str, encoded: &str) -> Result<bool, HashError> {
        if encoded.split('$').count() != ENCODED_FIELDS {
            return Err(HashError::InvalidHashFormat);
        }

        let parsed = PasswordHash::new(encoded).map_err(|e| {
            tracing::debug!("Failed to parse password hash: {:?}", e);
            HashError::InvalidHashFormat
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => {
                tracing::debug!("Password hash rejected: {:?}", e);
                Err(HashError::InvalidHashFormat)
            }
        }
    }
}

/// Validate a new password against the minimum length policy
pub fn validate_password_policy(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!("password must be at least {} characters", min_length));
    }
    Ok(())
}
