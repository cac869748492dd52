//! Bank API Shared Library
//!
//! Wire types, the public account model, validation helpers, and the
//! transport-free error taxonomy used by the backend and API clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::Account;
pub use types::*;
