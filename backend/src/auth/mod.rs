//! Authentication and authorization
//!
//! bcrypt credential hashing, HS256 session tokens, and the gate that binds
//! a token to the account a request addresses.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtKeys, TokenService, SIGNING_ALGORITHM};
pub use middleware::{
    extract_token, require_account_owner, AuthorizationGate, AuthorizedAccount, DenyReason,
};
pub use password::CredentialCodec;
