//! Account service for account management and login
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on blocking thread pool
//! - Token service is passed by reference (pre-computed keys)

use crate::auth::{CredentialCodec, TokenService};
use crate::error::ApiError;
use crate::repositories::{AccountChanges, AccountStore, NewAccount, StoreError};
use bank_api_shared::models::{MAX_ACCOUNT_NUMBER, MIN_ACCOUNT_NUMBER};
use bank_api_shared::{Account, AuthError, CreateAccountRequest, LoginResponse, UpdateAccountRequest};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

/// Number allocation attempts before giving up on collisions
const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Account service
pub struct AccountService;

impl AccountService {
    /// Create a new account
    ///
    /// Hashes the password on the blocking pool and allocates a random
    /// 8-digit account number, retrying on collision.
    pub async fn create(
        store: &dyn AccountStore,
        codec: &CredentialCodec,
        req: CreateAccountRequest,
    ) -> Result<Account, ApiError> {
        req.validate()?;

        let password_hash = codec
            .hash_async(req.password)
            .await
            .map_err(ApiError::Internal)?;

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let number = Self::generate_number();
            let new_account = NewAccount {
                first_name: req.first_name.clone(),
                last_name: req.last_name.clone(),
                number,
                password_hash: password_hash.clone(),
            };

            match store.create(new_account).await {
                Ok(record) => {
                    info!(account_id = %record.id, number = record.number, "Account created");
                    return Ok(record.into());
                }
                Err(StoreError::Conflict(_)) => {
                    debug!(attempt, number, "Account number collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ApiError::Conflict(
            "Could not allocate a unique account number".to_string(),
        ))
    }

    /// List all accounts
    pub async fn list(store: &dyn AccountStore) -> Result<Vec<Account>, ApiError> {
        let records = store.list().await?;
        Ok(records.into_iter().map(Account::from).collect())
    }

    /// Get one account
    pub async fn get(store: &dyn AccountStore, id: Uuid) -> Result<Account, ApiError> {
        Ok(store.find_by_id(id).await?.into())
    }

    /// Update names and, optionally, the password
    pub async fn update(
        store: &dyn AccountStore,
        codec: &CredentialCodec,
        id: Uuid,
        req: UpdateAccountRequest,
    ) -> Result<Account, ApiError> {
        req.validate()?;

        let password_hash = match req.password {
            Some(password) => Some(codec.hash_async(password).await.map_err(ApiError::Internal)?),
            None => None,
        };
        let password_changed = password_hash.is_some();

        let changes = AccountChanges {
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        };

        let record = store.update(id, changes).await?;
        info!(account_id = %record.id, password_changed, "Account updated");
        Ok(record.into())
    }

    /// Delete an account
    pub async fn delete(store: &dyn AccountStore, id: Uuid) -> Result<(), ApiError> {
        store.delete(id).await?;
        info!(account_id = %id, "Account deleted");
        Ok(())
    }

    /// Login with account number and password
    ///
    /// An unknown number, a failed or timed-out lookup, and a wrong password
    /// all return [`AuthError::InvalidCredentials`], and each costs one
    /// bcrypt check.
    pub async fn login(
        store: &dyn AccountStore,
        codec: &CredentialCodec,
        tokens: &TokenService,
        lookup_timeout: Duration,
        number: i64,
        password: &str,
    ) -> Result<LoginResponse, AuthError> {
        let lookup = tokio::time::timeout(lookup_timeout, store.find_by_number(number)).await;
        let account = match lookup {
            Ok(Ok(account)) => Some(account),
            Ok(Err(StoreError::NotFound)) => None,
            Ok(Err(e)) => {
                warn!(error = %e, "Account lookup failed during login");
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = lookup_timeout.as_millis() as u64,
                    "Account lookup timed out during login"
                );
                None
            }
        };

        let Some(account) = account else {
            codec
                .verify_dummy_async(password.to_string())
                .await
                .map_err(|e| AuthError::Internal(e.to_string()))?;
            debug!(number, "Login rejected: no such account");
            return Err(AuthError::InvalidCredentials);
        };

        let valid = codec
            .verify_async(account.password_hash, password.to_string())
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !valid {
            debug!(number, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = tokens
            .issue(account.number)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        info!(number = account.number, "Login succeeded");
        Ok(LoginResponse {
            number: account.number,
            token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.token_ttl_secs(),
        })
    }

    fn generate_number() -> i64 {
        rand::thread_rng().gen_range(MIN_ACCOUNT_NUMBER..=MAX_ACCOUNT_NUMBER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{AccountRecord, InMemoryAccountStore};
    use async_trait::async_trait;
    use secrecy::SecretString;

    const LOOKUP: Duration = Duration::from_secs(5);

    fn codec() -> CredentialCodec {
        CredentialCodec::new(4).unwrap()
    }

    fn tokens() -> TokenService {
        TokenService::new(&SecretString::new("service-test-secret".to_string()), 3600).unwrap()
    }

    fn create_request(password: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            first_name: "Andres".to_string(),
            last_name: "CG".to_string(),
            password: password.to_string(),
        }
    }

    /// Store that fails every call with a connectivity error
    struct BrokenStore;

    #[async_trait]
    impl AccountStore for BrokenStore {
        async fn create(&self, _: NewAccount) -> Result<AccountRecord, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn list(&self) -> Result<Vec<AccountRecord>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_id(&self, _: Uuid) -> Result<AccountRecord, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn find_by_number(&self, _: i64) -> Result<AccountRecord, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn update(&self, _: Uuid, _: AccountChanges) -> Result<AccountRecord, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn delete(&self, _: Uuid) -> Result<(), StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    /// Store where every number is already taken
    struct FullStore;

    #[async_trait]
    impl AccountStore for FullStore {
        async fn create(&self, _: NewAccount) -> Result<AccountRecord, StoreError> {
            Err(StoreError::Conflict("taken".to_string()))
        }
        async fn list(&self) -> Result<Vec<AccountRecord>, StoreError> {
            Ok(Vec::new())
        }
        async fn find_by_id(&self, _: Uuid) -> Result<AccountRecord, StoreError> {
            Err(StoreError::NotFound)
        }
        async fn find_by_number(&self, _: i64) -> Result<AccountRecord, StoreError> {
            Err(StoreError::NotFound)
        }
        async fn update(&self, _: Uuid, _: AccountChanges) -> Result<AccountRecord, StoreError> {
            Err(StoreError::NotFound)
        }
        async fn delete(&self, _: Uuid) -> Result<(), StoreError> {
            Err(StoreError::NotFound)
        }
    }

    #[tokio::test]
    async fn test_create_hashes_password_and_allocates_number() {
        let store = InMemoryAccountStore::new();
        let account = AccountService::create(&store, &codec(), create_request("password-1"))
            .await
            .unwrap();

        assert!(Account::is_valid_number(account.number));
        assert_eq!(account.balance, 0);

        let record = store.find_by_id(account.id).await.unwrap();
        assert_ne!(record.password_hash, "password-1");
        assert!(codec().verify(&record.password_hash, "password-1"));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_request() {
        let store = InMemoryAccountStore::new();
        let result = AccountService::create(&store, &codec(), create_request("abc")).await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_create_gives_up_after_repeated_collisions() {
        let result = AccountService::create(&FullStore, &codec(), create_request("password-1")).await;
        assert!(matches!(result, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_login_success_returns_verifiable_token() {
        let store = InMemoryAccountStore::new();
        let account = AccountService::create(&store, &codec(), create_request("s3cret"))
            .await
            .unwrap();

        let tokens = tokens();
        let response = AccountService::login(&store, &codec(), &tokens, LOOKUP, account.number, "s3cret")
            .await
            .unwrap();

        assert_eq!(response.number, account.number);
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);
        assert_eq!(tokens.verify(&response.token).unwrap().account_number, account.number);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = InMemoryAccountStore::new();
        let account = AccountService::create(&store, &codec(), create_request("s3cret"))
            .await
            .unwrap();
        let unknown = if account.number == MIN_ACCOUNT_NUMBER {
            MAX_ACCOUNT_NUMBER
        } else {
            MIN_ACCOUNT_NUMBER
        };

        let wrong_password =
            AccountService::login(&store, &codec(), &tokens(), LOOKUP, account.number, "nope-nope").await;
        let unknown_number =
            AccountService::login(&store, &codec(), &tokens(), LOOKUP, unknown, "s3cret").await;
        let broken_store =
            AccountService::login(&BrokenStore, &codec(), &tokens(), LOOKUP, account.number, "s3cret").await;

        assert_eq!(wrong_password, Err(AuthError::InvalidCredentials));
        assert_eq!(unknown_number, Err(AuthError::InvalidCredentials));
        assert_eq!(broken_store, Err(AuthError::InvalidCredentials));
    }

    /// Store whose lookups never finish
    struct StalledStore;

    #[async_trait]
    impl AccountStore for StalledStore {
        async fn create(&self, _: NewAccount) -> Result<AccountRecord, StoreError> {
            std::future::pending().await
        }
        async fn list(&self) -> Result<Vec<AccountRecord>, StoreError> {
            std::future::pending().await
        }
        async fn find_by_id(&self, _: Uuid) -> Result<AccountRecord, StoreError> {
            std::future::pending().await
        }
        async fn find_by_number(&self, _: i64) -> Result<AccountRecord, StoreError> {
            std::future::pending().await
        }
        async fn update(&self, _: Uuid, _: AccountChanges) -> Result<AccountRecord, StoreError> {
            std::future::pending().await
        }
        async fn delete(&self, _: Uuid) -> Result<(), StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_login_stalled_lookup_is_invalid_credentials() {
        let result = AccountService::login(
            &StalledStore,
            &codec(),
            &tokens(),
            Duration::from_millis(20),
            12_345_678,
            "s3cret",
        )
        .await;

        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_update_changes_password() {
        let store = InMemoryAccountStore::new();
        let account = AccountService::create(&store, &codec(), create_request("old-password"))
            .await
            .unwrap();

        let req = UpdateAccountRequest {
            first_name: Some("Andrea".to_string()),
            password: Some("new-password".to_string()),
            ..Default::default()
        };
        let updated = AccountService::update(&store, &codec(), account.id, req)
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Andrea");
        assert_eq!(updated.last_name, "CG");

        let old = AccountService::login(&store, &codec(), &tokens(), LOOKUP, account.number, "old-password").await;
        let new = AccountService::login(&store, &codec(), &tokens(), LOOKUP, account.number, "new-password").await;
        assert_eq!(old, Err(AuthError::InvalidCredentials));
        assert!(new.is_ok());
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let store = InMemoryAccountStore::new();
        let account = AccountService::create(&store, &codec(), create_request("password-1"))
            .await
            .unwrap();

        assert_eq!(AccountService::get(&store, account.id).await.unwrap(), account);
        assert_eq!(AccountService::list(&store).await.unwrap().len(), 1);

        AccountService::delete(&store, account.id).await.unwrap();
        assert!(matches!(
            AccountService::get(&store, account.id).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_generated_numbers_in_range() {
        for _ in 0..1000 {
            assert!(Account::is_valid_number(AccountService::generate_number()));
        }
    }
}
