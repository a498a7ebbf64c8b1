//! Listings scoped to the signed-in user. Both routes sit behind
//! [`require_token`](crate::api::handlers::auth::require_token).

use axum::{
    extract::{rejection::PathRejection, Extension, Path},
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    api::{
        error::{ApiError, ErrorResponse, IDENTITY_MISMATCH},
        handlers::auth::Claims,
    },
    foods::{Food, FoodStore},
};

fn ensure_owner(claims: &Claims, email: &str) -> Result<(), ApiError> {
    if claims.email == email {
        Ok(())
    } else {
        debug!("Token email does not match the requested email");
        Err(ApiError::Forbidden(IDENTITY_MISMATCH))
    }
}

#[utoipa::path(
    get,
    path = "/manageMyFoods/{email}",
    params(("email" = String, Path, description = "Donator email; must match the token")),
    responses(
        (status = 200, description = "Listings donated by the user", body = [Food]),
        (status = 401, description = "No token cookie", body = ErrorResponse),
        (status = 403, description = "Invalid token or another user's email", body = ErrorResponse)
    ),
    tag = "my-foods"
)]
#[instrument(skip_all)]
pub async fn manage_my_foods(
    store: Extension<Arc<dyn FoodStore>>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Food>>, ApiError> {
    let Path(email) = path?;
    ensure_owner(&claims, &email)?;
    Ok(Json(store.find_by_donator(&email).await?))
}

#[utoipa::path(
    get,
    path = "/myRequestedFoods/{email}",
    params(("email" = String, Path, description = "Requester email; must match the token")),
    responses(
        (status = 200, description = "Listings requested by the user", body = [Food]),
        (status = 401, description = "No token cookie", body = ErrorResponse),
        (status = 403, description = "Invalid token or another user's email", body = ErrorResponse)
    ),
    tag = "my-foods"
)]
#[instrument(skip_all)]
pub async fn my_requested_foods(
    store: Extension<Arc<dyn FoodStore>>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<Food>>, ApiError> {
    let Path(email) = path?;
    ensure_owner(&claims, &email)?;
    Ok(Json(store.find_by_requester(&email).await?))
}
