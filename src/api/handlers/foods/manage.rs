//! Write endpoints. Each issues exactly one store call.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path,
    },
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::types::{CancelRequest, FoodsRequest};
use crate::{
    api::error::{ApiError, ErrorResponse},
    foods::{DeleteResult, FoodId, FoodListing, FoodStore, InsertResult, StatusChange, UpdateResult},
};

#[utoipa::path(
    post,
    path = "/addFood",
    request_body = FoodListing,
    responses(
        (status = 200, description = "Listing stored", body = InsertResult),
        (status = 400, description = "Malformed listing", body = ErrorResponse)
    ),
    tag = "foods"
)]
#[instrument(skip_all)]
pub async fn add_food(
    store: Extension<Arc<dyn FoodStore>>,
    payload: Result<Json<FoodListing>, JsonRejection>,
) -> Result<Json<InsertResult>, ApiError> {
    let Json(listing) = payload?;
    let result = store.insert_one(&listing).await?;
    info!(id = %result.inserted_id, "Food listing added");
    Ok(Json(result))
}

#[utoipa::path(
    patch,
    path = "/cancelRequest/{id}",
    params(("id" = String, Path, description = "Listing id")),
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Request fields updated", body = UpdateResult),
        (status = 400, description = "Malformed id or body", body = ErrorResponse)
    ),
    tag = "requests"
)]
#[instrument(skip(store, payload))]
pub async fn cancel_request(
    store: Extension<Arc<dyn FoodStore>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> Result<Json<UpdateResult>, ApiError> {
    let Path(id) = path?;
    let id: FoodId = id.parse()?;
    let Json(request) = payload?;
    let change = StatusChange::from(request);
    Ok(Json(store.update_status(id, &change).await?))
}

#[utoipa::path(
    patch,
    path = "/foodsRequest/{id}",
    params(("id" = String, Path, description = "Listing id")),
    request_body = FoodsRequest,
    responses(
        (status = 200, description = "Listing requested", body = UpdateResult),
        (status = 400, description = "Malformed id or body", body = ErrorResponse)
    ),
    tag = "requests"
)]
#[instrument(skip(store, payload))]
pub async fn foods_request(
    store: Extension<Arc<dyn FoodStore>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<FoodsRequest>, JsonRejection>,
) -> Result<Json<UpdateResult>, ApiError> {
    let Path(id) = path?;
    let id: FoodId = id.parse()?;
    let Json(request) = payload?;
    let change = StatusChange::from(request);
    Ok(Json(store.update_status(id, &change).await?))
}

#[utoipa::path(
    put,
    path = "/updateFood/{id}",
    params(("id" = String, Path, description = "Listing id")),
    request_body = FoodListing,
    responses(
        (status = 200, description = "Listing replaced, or inserted under this id", body = UpdateResult),
        (status = 400, description = "Malformed id or body", body = ErrorResponse)
    ),
    tag = "foods"
)]
#[instrument(skip(store, payload))]
pub async fn update_food(
    store: Extension<Arc<dyn FoodStore>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<FoodListing>, JsonRejection>,
) -> Result<Json<UpdateResult>, ApiError> {
    let Path(id) = path?;
    let id: FoodId = id.parse()?;
    let Json(listing) = payload?;
    Ok(Json(store.replace(id, &listing).await?))
}

#[utoipa::path(
    delete,
    path = "/foodDelete/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "Deletion outcome", body = DeleteResult),
        (status = 400, description = "Malformed id", body = ErrorResponse)
    ),
    tag = "foods"
)]
#[instrument(skip(store))]
pub async fn delete_food(
    store: Extension<Arc<dyn FoodStore>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteResult>, ApiError> {
    let Path(id) = path?;
    let id: FoodId = id.parse()?;
    let result = store.delete_one(id).await?;
    if result.deleted_count > 0 {
        info!(%id, "Food listing deleted");
    }
    Ok(Json(result))
}
