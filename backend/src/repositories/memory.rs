//! In-memory account repository
//!
//! Used by tests and by `database.in_memory = true` for local runs.

use super::{AccountChanges, AccountRecord, AccountStore, NewAccount, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Account store backed by a process-local map
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, AccountRecord>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed record, keeping its id and number
    pub async fn insert(&self, record: AccountRecord) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.number == record.number) {
            return Err(StoreError::Conflict("Account number already in use".to_string()));
        }
        accounts.insert(record.id, record);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<AccountRecord, StoreError> {
        let record = AccountRecord {
            id: Uuid::new_v4(),
            first_name: account.first_name,
            last_name: account.last_name,
            number: account.number,
            password_hash: account.password_hash,
            balance: 0,
            created_at: Utc::now(),
        };
        self.insert(record.clone()).await?;
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<AccountRecord>, StoreError> {
        let mut accounts: Vec<_> = self.accounts.read().await.values().cloned().collect();
        accounts.sort_by_key(|a| a.created_at);
        Ok(accounts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<AccountRecord, StoreError> {
        self.accounts
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_number(&self, number: i64) -> Result<AccountRecord, StoreError> {
        self.accounts
            .read()
            .await
            .values()
            .find(|a| a.number == number)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: Uuid, changes: AccountChanges) -> Result<AccountRecord, StoreError> {
        let mut accounts = self.accounts.write().await;
        let record = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(first_name) = changes.first_name {
            record.first_name = first_name;
        }
        if let Some(last_name) = changes.last_name {
            record.last_name = last_name;
        }
        if let Some(password_hash) = changes.password_hash {
            record.password_hash = password_hash;
        }

        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.accounts
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(number: i64) -> NewAccount {
        NewAccount {
            first_name: "Andres".to_string(),
            last_name: "CG".to_string(),
            number,
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryAccountStore::new();
        let created = store.create(new_account(11_111_111)).await.unwrap();

        let by_id = store.find_by_id(created.id).await.unwrap();
        let by_number = store.find_by_number(11_111_111).await.unwrap();

        assert_eq!(by_id.id, created.id);
        assert_eq!(by_number.id, created.id);
        assert_eq!(created.balance, 0);
    }

    #[tokio::test]
    async fn test_duplicate_number_conflicts() {
        let store = InMemoryAccountStore::new();
        store.create(new_account(22_222_222)).await.unwrap();

        let result = store.create(new_account(22_222_222)).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_missing_lookups_are_not_found() {
        let store = InMemoryAccountStore::new();
        assert!(matches!(
            store.find_by_id(Uuid::new_v4()).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.find_by_number(12_345_678).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_only_touches_given_fields() {
        let store = InMemoryAccountStore::new();
        let created = store.create(new_account(33_333_333)).await.unwrap();

        let updated = store
            .update(
                created.id,
                AccountChanges {
                    last_name: Some("Garcia".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Andres");
        assert_eq!(updated.last_name, "Garcia");
        assert_eq!(updated.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryAccountStore::new();
        let created = store.create(new_account(44_444_444)).await.unwrap();

        store.delete(created.id).await.unwrap();
        assert!(store.is_empty().await);
        assert!(matches!(store.delete(created.id).await, Err(StoreError::NotFound)));
    }
}
