//! PostgreSQL account repository

use super::{AccountChanges, AccountRecord, AccountStore, NewAccount, StoreError};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str =
    "id, first_name, last_name, number, password_hash, balance, created_at";

/// PostgreSQL-backed account store
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the account table if it does not exist yet
    pub async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS account (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                first_name VARCHAR(255) NOT NULL,
                last_name VARCHAR(255) NOT NULL,
                number BIGINT NOT NULL UNIQUE,
                password_hash VARCHAR(255) NOT NULL,
                balance BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Account table ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_unique_violation(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict("Account number already in use".to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: NewAccount) -> Result<AccountRecord, StoreError> {
        let query = format!(
            r#"
            INSERT INTO account (first_name, last_name, number, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );

        sqlx::query_as::<_, AccountRecord>(&query)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(account.number)
            .bind(&account.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)
    }

    async fn list(&self) -> Result<Vec<AccountRecord>, StoreError> {
        let query = format!("SELECT {} FROM account ORDER BY created_at", ACCOUNT_COLUMNS);

        let accounts = sqlx::query_as::<_, AccountRecord>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(accounts)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<AccountRecord, StoreError> {
        let query = format!("SELECT {} FROM account WHERE id = $1", ACCOUNT_COLUMNS);

        sqlx::query_as::<_, AccountRecord>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_number(&self, number: i64) -> Result<AccountRecord, StoreError> {
        let query = format!("SELECT {} FROM account WHERE number = $1", ACCOUNT_COLUMNS);

        sqlx::query_as::<_, AccountRecord>(&query)
            .bind(number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: Uuid, changes: AccountChanges) -> Result<AccountRecord, StoreError> {
        let query = format!(
            r#"
            UPDATE account SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                password_hash = COALESCE($4, password_hash)
            WHERE id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );

        sqlx::query_as::<_, AccountRecord>(&query)
            .bind(id)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.password_hash)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM account WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::db::health_check(&self.pool).await?;
        Ok(())
    }
}
