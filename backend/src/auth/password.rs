//! Password hashing using bcrypt
//!
//! Provides salted one-way hashing and verification with a configurable
//! cost factor.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. Async callers should use the
//! `*_async` variants, which run on the blocking thread pool.

use anyhow::Result;
use bank_api_shared::ConfigError;
use std::sync::Arc;

use crate::config::{MAX_HASH_COST, MIN_HASH_COST};

/// Plaintext hashed once at startup to back [`CredentialCodec::verify_dummy`]
const DUMMY_PASSWORD: &str = "dummy-password-for-timing";

/// Password hashing service
///
/// Cloning is cheap; the cost factor is fixed at construction.
#[derive(Clone)]
pub struct CredentialCodec {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("cost", &self.cost)
            .finish()
    }
}

impl CredentialCodec {
    /// Create a codec with the given bcrypt cost
    ///
    /// Hashes one dummy password so the cost is exercised at startup.
    pub fn new(cost: u32) -> Result<Self, ConfigError> {
        if !(MIN_HASH_COST..=MAX_HASH_COST).contains(&cost) {
            return Err(ConfigError::InvalidHashCost(cost));
        }
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost)
            .map_err(|_| ConfigError::InvalidHashCost(cost))?;

        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password (blocking operation)
    ///
    /// Every call draws a fresh salt, so the same input yields different
    /// strings that all verify.
    pub fn hash(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
    }

    /// Verify a password against a hash (blocking operation)
    ///
    /// A mismatch and a malformed hash both yield `false`.
    pub fn verify(&self, hash: &str, password: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Burn one verification against the dummy hash
    ///
    /// Used when there is no stored hash to check, so the caller spends the
    /// same work as a real mismatch. Always returns `false`.
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify(&self.dummy_hash, password);
        false
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(&self, password: String) -> Result<String> {
        let codec = self.clone();
        tokio::task::spawn_blocking(move || codec.hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password on the blocking thread pool
    pub async fn verify_async(&self, hash: String, password: String) -> Result<bool> {
        let codec = self.clone();
        tokio::task::spawn_blocking(move || codec.verify(&hash, &password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }

    /// Run [`verify_dummy`](Self::verify_dummy) on the blocking thread pool
    pub async fn verify_dummy_async(&self, password: String) -> Result<bool> {
        let codec = self.clone();
        tokio::task::spawn_blocking(move || codec.verify_dummy(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))
    }
}
