//! CSRF token issuance.
//!
//! Unauthenticated by design: the token's job is double-submit mitigation,
//! not identity. Tokens are time-boxed and single-use.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;

use crate::audit;
use crate::error::{ApiError, ApiResult, AppError};
use crate::security;
use crate::state::{AppState, RequestId};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/csrf-token",
            get(issue_token).fallback(method_not_allowed),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
}

async fn issue_token(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
) -> ApiResult<Json<TokenResponse>> {
    let token = state.csrf.issue().await.map_err(|err| {
        AppError::from(err)
            .with_request_id(&request_id)
            .exposing_detail(!state.settings.is_production())
    })?;
    audit::token_issued(&request_id, &security::client_ip(&headers));
    Ok(Json(TokenResponse { token }))
}

async fn method_not_allowed(Extension(RequestId(request_id)): Extension<RequestId>) -> ApiError {
    AppError::MethodNotAllowed.with_request_id(&request_id)
}
