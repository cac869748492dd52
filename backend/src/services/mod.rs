//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the account store, the credential codec, and the token service.

pub mod account;

pub use account::AccountService;
