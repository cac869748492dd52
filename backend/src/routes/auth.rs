//! Login route
//!
//! Password verification runs on the blocking thread pool; the token is
//! signed with the pre-computed keys from AppState.

use crate::error::ApiResult;
use crate::services::AccountService;
use crate::state::AppState;
use axum::{extract::State, routing::post, Json, Router};
use bank_api_shared::{LoginRequest, LoginResponse};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Login with account number and password
///
/// POST /api/v1/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = AccountService::login(
        state.store(),
        state.codec(),
        state.tokens(),
        state.config().auth.lookup_timeout(),
        req.number,
        &req.password,
    )
    .await?;
    Ok(Json(response))
}
