//! Error types for the Bank API
//!
//! These are transport-free; the backend maps them onto HTTP responses.

use thiserror::Error;

/// Startup configuration errors
///
/// Always fatal: they are raised while building the process-wide services
/// and never surface on a request path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT signing secret is not set")]
    MissingSigningSecret,

    #[error("JWT signing secret is too weak: {0}")]
    WeakSigningSecret(String),

    #[error("Invalid password hash cost {0}: must be between 4 and 31")]
    InvalidHashCost(u32),

    #[error("Invalid token lifetime {0}s: must be between 1s and 30 days")]
    InvalidTokenTtl(i64),

    #[error("Account lookup timeout must be greater than zero")]
    InvalidLookupTimeout,

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

/// Login errors
///
/// `InvalidCredentials` covers both an unknown account number and a wrong
/// password so callers cannot probe which numbers exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid account number or password")]
    InvalidCredentials,

    #[error("Internal authentication error: {0}")]
    Internal(String),
}

/// Token verification and issuance errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token signature does not verify")]
    BadSignature,

    #[error("Token declares an unexpected signing algorithm")]
    WrongAlgorithm,

    #[error("Token expired")]
    Expired,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}
