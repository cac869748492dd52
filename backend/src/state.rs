//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys, the codec's dummy hash
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling

use crate::auth::{AuthorizationGate, CredentialCodec, TokenService};
use crate::config::AppConfig;
use crate::repositories::AccountStore;
use bank_api_shared::ConfigError;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Account storage backend
    pub store: Arc<dyn AccountStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized token service with cached keys
    pub tokens: TokenService,
    /// Password hashing with the configured cost
    pub codec: CredentialCodec,
    /// Guard for account-scoped routes
    pub gate: AuthorizationGate,
}

impl AppState {
    /// Create a new application state
    ///
    /// Fails if the signing secret is missing or the hash cost is out of
    /// range. Call once at startup.
    pub fn new(store: Arc<dyn AccountStore>, config: AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let tokens = TokenService::new(&config.jwt.secret, config.jwt.token_ttl_secs)?;
        let codec = CredentialCodec::new(config.auth.hash_cost)?;
        let gate = AuthorizationGate::new(
            tokens.clone(),
            store.clone(),
            config.auth.lookup_timeout(),
        );

        Ok(Self {
            store,
            config: Arc::new(config),
            tokens,
            codec,
            gate,
        })
    }

    /// Get a reference to the account store
    #[inline]
    pub fn store(&self) -> &dyn AccountStore {
        self.store.as_ref()
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the token service
    #[inline]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Get a reference to the credential codec
    #[inline]
    pub fn codec(&self) -> &CredentialCodec {
        &self.codec
    }

    /// Get a reference to the authorization gate
    #[inline]
    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryAccountStore;
    use secrecy::SecretString;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.jwt.secret = SecretString::new("state-test-secret".to_string());
        config.auth.hash_cost = 4;
        config
    }

    #[test]
    fn test_state_requires_secret() {
        let result = AppState::new(Arc::new(InMemoryAccountStore::new()), AppConfig::default());
        assert!(matches!(result, Err(ConfigError::MissingSigningSecret)));
    }

    #[test]
    fn test_state_rejects_unbounded_token_ttl() {
        let mut config = test_config();
        config.jwt.token_ttl_secs = i64::MAX;

        let result = AppState::new(Arc::new(InMemoryAccountStore::new()), config);
        assert!(matches!(result, Err(ConfigError::InvalidTokenTtl(i64::MAX))));
    }

    #[test]
    fn test_state_clone_is_cheap() {
        let state = AppState::new(Arc::new(InMemoryAccountStore::new()), test_config()).unwrap();

        // Clone should be O(1) - just Arc increments
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
    }

    #[test]
    fn test_token_service_is_precomputed() {
        let state = AppState::new(Arc::new(InMemoryAccountStore::new()), test_config()).unwrap();

        let token = state.tokens().issue(12_345_678).unwrap();
        assert_eq!(state.tokens().verify(&token).unwrap().account_number, 12_345_678);
        assert_eq!(state.codec().cost(), 4);
    }
}
