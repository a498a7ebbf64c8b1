//! Token issuance and logout.

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::{
    cookie::{clear_token_cookie, token_cookie},
    state::AuthState,
};
use crate::api::{
    error::{ApiError, ErrorResponse},
    handlers::valid_email,
};

/// Identity submitted after the client signs in. Extra profile fields are ignored.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct TokenResponse {
    pub success: bool,
}

#[utoipa::path(
    post,
    path = "/jwt",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued in the `token` cookie", body = TokenResponse),
        (status = 400, description = "Missing or malformed email", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn issue_token(
    auth_state: Extension<Arc<AuthState>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let email = request.email.trim();
    if !valid_email(email) {
        return Err(ApiError::BadRequest("invalid email".to_string()));
    }

    let token = auth_state
        .issue(email)
        .map_err(|err| anyhow::anyhow!("Failed to sign token: {err}"))?;
    let cookie = token_cookie(auth_state.config(), &token)
        .map_err(|err| anyhow::anyhow!("Failed to build token cookie: {err}"))?;
    debug!("Issued token");

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((headers, Json(TokenResponse { success: true })))
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Token cookie cleared", body = TokenResponse)
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> Result<impl IntoResponse, ApiError> {
    let cookie = clear_token_cookie(auth_state.config())
        .map_err(|err| anyhow::anyhow!("Failed to build token cookie: {err}"))?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    Ok((headers, Json(TokenResponse { success: true })))
}
