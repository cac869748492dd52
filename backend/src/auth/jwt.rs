//! JWT token generation and validation
//!
//! Tokens are HS256-signed claims binding an account number to an expiry.
//! Keys are derived once from the configured secret and shared via `Arc`.

use crate::config::{MAX_TOKEN_TTL_SECS, MIN_TOKEN_TTL_SECS};
use bank_api_shared::{ConfigError, TokenError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The only algorithm tokens are signed or accepted with
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account number the bearer acts as
    #[serde(rename = "accountNumber")]
    pub account_number: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Derive keys from the signing secret
    ///
    /// An empty or whitespace-only secret is a configuration error.
    pub fn new(secret: &SecretString) -> Result<Self, ConfigError> {
        let secret = secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingSigningSecret);
        }
        Ok(Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        })
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// JWT service for token operations
///
/// Stateless apart from the immutable keys; clone freely across handlers.
#[derive(Clone)]
pub struct TokenService {
    keys: JwtKeys,
    validation: Arc<Validation>,
    token_ttl_secs: i64,
}

impl TokenService {
    /// Create a token service from the signing secret
    ///
    /// Call this once at application startup and store in AppState.
    /// `token_ttl_secs` must lie in `MIN_TOKEN_TTL_SECS..=MAX_TOKEN_TTL_SECS`.
    pub fn new(secret: &SecretString, token_ttl_secs: i64) -> Result<Self, ConfigError> {
        let keys = JwtKeys::new(secret)?;

        if !(MIN_TOKEN_TTL_SECS..=MAX_TOKEN_TTL_SECS).contains(&token_ttl_secs) {
            return Err(ConfigError::InvalidTokenTtl(token_ttl_secs));
        }

        // Only SIGNING_ALGORITHM is accepted; a token declaring anything else
        // fails before its signature is looked at.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            keys,
            validation: Arc::new(validation),
            token_ttl_secs,
        })
    }

    /// Issue a token for an account number
    pub fn issue(&self, account_number: i64) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.token_ttl_secs);

        let claims = Claims {
            account_number,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, self.keys.encoding())
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::WrongAlgorithm
                }
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })
    }

    /// Token lifetime in seconds
    #[inline]
    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl_secs
    }
}
