//! Account routes
//!
//! `/account` creates and lists accounts. `/account/:id` is guarded by
//! [`require_account_owner`]: its handlers only run for the account the
//! caller's token names, and read that account from request extensions.

use crate::auth::{require_account_owner, AuthorizedAccount};
use crate::error::ApiResult;
use crate::services::AccountService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use bank_api_shared::{Account, CreateAccountRequest, DeleteAccountResponse, UpdateAccountRequest};

/// Create account routes
pub fn account_routes(state: AppState) -> Router<AppState> {
    let owned = Router::new()
        .route("/:id", get(get_account).put(update_account).delete(delete_account))
        .route_layer(middleware::from_fn_with_state(state, require_account_owner));

    Router::new()
        .route("/", get(list_accounts).post(create_account))
        .merge(owned)
}

/// Create an account
///
/// POST /api/v1/account
async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let account = AccountService::create(state.store(), state.codec(), req).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// List accounts
///
/// GET /api/v1/account
async fn list_accounts(State(state): State<AppState>) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(AccountService::list(state.store()).await?))
}

/// GET /api/v1/account/:id
async fn get_account(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthorizedAccount>,
) -> ApiResult<Json<Account>> {
    Ok(Json(AccountService::get(state.store(), owner.id).await?))
}

/// PUT /api/v1/account/:id
async fn update_account(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthorizedAccount>,
    Json(req): Json<UpdateAccountRequest>,
) -> ApiResult<Json<Account>> {
    let account = AccountService::update(state.store(), state.codec(), owner.id, req).await?;
    Ok(Json(account))
}

/// DELETE /api/v1/account/:id
async fn delete_account(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthorizedAccount>,
) -> ApiResult<Json<DeleteAccountResponse>> {
    AccountService::delete(state.store(), owner.id).await?;
    Ok(Json(DeleteAccountResponse {
        deleted: owner.id.to_string(),
    }))
}
