//! Authorization gate
//!
//! Guards account-scoped routes: the bearer's token must verify and name the
//! same account number as the account addressed by the request path.
//!
//! [`AuthorizationGate::authorize`] holds the decision and knows nothing
//! about axum; [`require_account_owner`] adapts it to a route layer.
//! Every denial renders as the same `ApiError::PermissionDenied`; the cause
//! is only logged.

use crate::auth::jwt::TokenService;
use crate::error::ApiError;
use crate::repositories::{AccountStore, StoreError};
use crate::state::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use bank_api_shared::{validation::validate_account_id, TokenError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Account the request was authorized to act on
///
/// Inserted into request extensions once the gate allows a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizedAccount {
    pub id: Uuid,
    pub number: i64,
}

/// Why the gate refused a request. Internal only; never sent to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    MissingToken,
    InvalidToken(TokenError),
    MalformedAccountId,
    AccountNotFound,
    StoreUnavailable,
    AccountMismatch,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::MissingToken => write!(f, "missing token"),
            DenyReason::InvalidToken(e) => write!(f, "invalid token: {}", e),
            DenyReason::MalformedAccountId => write!(f, "malformed account id"),
            DenyReason::AccountNotFound => write!(f, "account not found"),
            DenyReason::StoreUnavailable => write!(f, "account store unavailable"),
            DenyReason::AccountMismatch => write!(f, "token does not match account"),
        }
    }
}

/// Request guard binding a token's account number to the addressed account
#[derive(Clone)]
pub struct AuthorizationGate {
    tokens: TokenService,
    store: Arc<dyn AccountStore>,
    lookup_timeout: Duration,
}

impl AuthorizationGate {
    pub fn new(tokens: TokenService, store: Arc<dyn AccountStore>, lookup_timeout: Duration) -> Self {
        Self {
            tokens,
            store,
            lookup_timeout,
        }
    }

    /// Decide whether `token` may act on the account identified by `resource_id`
    ///
    /// Steps run in order and the first failure wins: token present, token
    /// verifies, id parses, account loads within the lookup timeout, and the
    /// token's account number equals the loaded account's number.
    pub async fn authorize(
        &self,
        token: Option<&str>,
        resource_id: &str,
    ) -> Result<AuthorizedAccount, DenyReason> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(DenyReason::MissingToken)?;

        let claims = self.tokens.verify(token).map_err(DenyReason::InvalidToken)?;

        let id = validate_account_id(resource_id).map_err(|_| DenyReason::MalformedAccountId)?;

        let lookup = tokio::time::timeout(self.lookup_timeout, self.store.find_by_id(id)).await;
        let account = match lookup {
            Ok(Ok(account)) => account,
            Ok(Err(StoreError::NotFound)) => return Err(DenyReason::AccountNotFound),
            Ok(Err(e)) => {
                debug!(error = %e, "Account lookup failed during authorization");
                return Err(DenyReason::StoreUnavailable);
            }
            Err(_) => {
                debug!(
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "Account lookup timed out"
                );
                return Err(DenyReason::StoreUnavailable);
            }
        };

        if account.number != claims.account_number {
            return Err(DenyReason::AccountMismatch);
        }

        Ok(AuthorizedAccount {
            id: account.id,
            number: account.number,
        })
    }
}

/// Read the token from the `Authorization` header
///
/// Accepts either the raw token or `Bearer <token>`.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    Some(value.strip_prefix("Bearer ").unwrap_or(value).trim())
}

/// Route-layer middleware enforcing [`AuthorizationGate`] on `/:id` routes
///
/// On success the wrapped handler runs with [`AuthorizedAccount`] in the
/// request extensions.
pub async fn require_account_owner(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let resource_id = match path {
        Ok(Path(id)) => id,
        Err(rejection) => {
            warn!(reason = %rejection, "Authorization denied");
            return Err(ApiError::PermissionDenied);
        }
    };

    let token = extract_token(request.headers());
    let decision = state.gate().authorize(token, &resource_id).await;
    match decision {
        Ok(account) => {
            debug!(account_number = account.number, "Authorization granted");
            request.extensions_mut().insert(account);
            Ok(next.run(request).await)
        }
        Err(reason) => {
            warn!(%reason, path = %request.uri().path(), "Authorization denied");
            Err(ApiError::PermissionDenied)
        }
    }
}
