//! Public read endpoints.

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Extension, Path, Query,
    },
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    api::error::{ApiError, ErrorResponse},
    foods::{AvailableFilter, AvailableQuery, Food, FoodId, FoodStore},
};

#[utoipa::path(
    get,
    path = "/featuredFoods",
    responses(
        (status = 200, description = "All listings, largest quantity first", body = [Food])
    ),
    tag = "foods"
)]
#[instrument(skip_all)]
pub async fn featured_foods(
    store: Extension<Arc<dyn FoodStore>>,
) -> Result<Json<Vec<Food>>, ApiError> {
    Ok(Json(store.find_all().await?))
}

#[utoipa::path(
    get,
    path = "/featuredFoods/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "The listing, or `null` when it does not exist", body = Food),
        (status = 400, description = "Malformed id", body = ErrorResponse)
    ),
    tag = "foods"
)]
#[instrument(skip(store))]
pub async fn food_by_id(
    store: Extension<Arc<dyn FoodStore>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Option<Food>>, ApiError> {
    let Path(id) = path?;
    let id: FoodId = id.parse()?;
    Ok(Json(store.find_one(id).await?))
}

/// Same lookup, under the path the request page uses.
#[utoipa::path(
    get,
    path = "/remainingFoods/{id}",
    params(("id" = String, Path, description = "Listing id")),
    responses(
        (status = 200, description = "The listing, or `null` when it does not exist", body = Food),
        (status = 400, description = "Malformed id", body = ErrorResponse)
    ),
    tag = "foods"
)]
#[instrument(skip(store))]
pub async fn remaining_food_by_id(
    store: Extension<Arc<dyn FoodStore>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Option<Food>>, ApiError> {
    food_by_id(store, path).await
}

#[utoipa::path(
    get,
    path = "/availableFoods",
    params(AvailableQuery),
    responses(
        (status = 200, description = "Available listings matching the search", body = [Food]),
        (status = 400, description = "Malformed query string", body = ErrorResponse)
    ),
    tag = "foods"
)]
#[instrument(skip_all)]
pub async fn available_foods(
    store: Extension<Arc<dyn FoodStore>>,
    query: Result<Query<AvailableQuery>, QueryRejection>,
) -> Result<Json<Vec<Food>>, ApiError> {
    let Query(query) = query?;
    let filter = AvailableFilter::from_query(&query);
    debug!(?filter, "Listing available foods");
    Ok(Json(store.find_available(&filter).await?))
}
