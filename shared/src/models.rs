//! Domain models shared between the backend and API clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest account number that can be allocated
pub const MIN_ACCOUNT_NUMBER: i64 = 10_000_000;

/// Highest account number that can be allocated
pub const MAX_ACCOUNT_NUMBER: i64 = 99_999_999;

/// Public view of a bank account
///
/// Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub number: i64,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Check that a number lies in the allocatable 8-digit range
    pub fn is_valid_number(number: i64) -> bool {
        (MIN_ACCOUNT_NUMBER..=MAX_ACCOUNT_NUMBER).contains(&number)
    }
}
