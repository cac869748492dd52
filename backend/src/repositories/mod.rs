//! Account storage
//!
//! The auth core only reads accounts through [`AccountStore`]; the CRUD
//! handlers use the rest of the trait.

pub mod account;
pub mod memory;

use async_trait::async_trait;
use bank_api_shared::Account;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub use account::PgAccountStore;
pub use memory::InMemoryAccountStore;

/// Stored account record, including the password hash
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub password_hash: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            number: record.number,
            balance: record.balance,
            created_at: record.created_at,
        }
    }
}

/// Input for creating an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub password_hash: String,
}

/// Input for updating an account; `None` leaves a column unchanged
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Account not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Account storage backend
///
/// Implementations own their concurrency control; callers share one
/// instance across all requests.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, account: NewAccount) -> Result<AccountRecord, StoreError>;
    async fn list(&self) -> Result<Vec<AccountRecord>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<AccountRecord, StoreError>;
    async fn find_by_number(&self, number: i64) -> Result<AccountRecord, StoreError>;
    async fn update(&self, id: Uuid, changes: AccountChanges) -> Result<AccountRecord, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
