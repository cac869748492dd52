//! API request and response types

use serde::{Deserialize, Serialize};
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub number: i64,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub number: i64,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Account creation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, max = 255, message = "First name must be 1-255 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255, message = "Last name must be 1-255 characters"))]
    pub last_name: String,
    #[validate(custom(function = "crate::validation::validate_password_field"))]
    pub password: String,
}

/// Account update request
///
/// Absent fields are left unchanged. A present `password` replaces the
/// stored credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 255, message = "First name must be 1-255 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Last name must be 1-255 characters"))]
    pub last_name: Option<String>,
    #[validate(custom(function = "crate::validation::validate_password_field"))]
    pub password: Option<String>,
}

/// Account deletion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
    pub deleted: String,
}
