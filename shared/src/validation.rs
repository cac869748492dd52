//! Input validation functions
//!
//! Custom validators plugged into the `validator` derive on request types.

use validator::ValidationError;

/// Minimum password length in characters
pub const PASSWORD_MIN_CHARS: usize = 6;

/// bcrypt only reads the first 72 bytes of its input
pub const PASSWORD_MAX_BYTES: usize = 72;

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(format!(
            "Password must be at least {} characters",
            PASSWORD_MIN_CHARS
        ));
    }
    if password.len() > PASSWORD_MAX_BYTES {
        return Err(format!(
            "Password must be at most {} bytes",
            PASSWORD_MAX_BYTES
        ));
    }
    Ok(())
}

/// `validator` adapter for [`validate_password`]
pub fn validate_password_field(password: &str) -> Result<(), ValidationError> {
    validate_password(password).map_err(|msg| {
        let mut err = ValidationError::new("password");
        err.message = Some(msg.into());
        err
    })
}

/// Validate a raw account identifier path segment
pub fn validate_account_id(raw: &str) -> Result<uuid::Uuid, String> {
    uuid::Uuid::parse_str(raw).map_err(|e| format!("Invalid account id {}: {}", raw, e))
}
