use axum::{extract::Request, middleware::Next, response::Response, Extension};
use std::sync::Arc;
use tracing::debug;

use super::{cookie::extract_token_cookie, state::AuthState};
use crate::api::error::{ApiError, INVALID_TOKEN};

/// Reject requests without a valid `token` cookie and expose its [`super::Claims`]
/// to the handler as a request extension.
///
/// # Errors
/// `Unauthorized` when the cookie is missing, `Forbidden` when the token does not verify.
pub async fn require_token(
    Extension(auth_state): Extension<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = extract_token_cookie(request.headers()) else {
        return Err(ApiError::Unauthorized);
    };

    let claims = auth_state.verify(&token).map_err(|err| {
        debug!("Token rejected: {err}");
        ApiError::Forbidden(INVALID_TOKEN)
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
