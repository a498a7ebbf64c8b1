use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::{
    filter::AvailableFilter,
    models::{Food, FoodId, FoodListing, StatusChange},
};

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of inserting a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: FoodId,
}

impl InsertResult {
    #[must_use]
    pub const fn new(inserted_id: FoodId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Outcome of a single-document update, optionally upserting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<FoodId>,
}

impl UpdateResult {
    #[must_use]
    pub const fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: if modified { 1 } else { 0 },
            upserted_count: 0,
            upserted_id: None,
        }
    }

    #[must_use]
    pub const fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        }
    }

    #[must_use]
    pub const fn upserted(id: FoodId) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        }
    }
}

/// Outcome of deleting a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    #[must_use]
    pub const fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// The `foods` collection. Every method is exactly one storage operation.
#[async_trait]
pub trait FoodStore: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<()>;

    /// All listings, largest `foodQuantity` first.
    async fn find_all(&self) -> Result<Vec<Food>>;

    async fn find_one(&self, id: FoodId) -> Result<Option<Food>>;

    async fn find_available(&self, filter: &AvailableFilter) -> Result<Vec<Food>>;

    /// Listings whose `donator.donatorEmail` equals `email`.
    async fn find_by_donator(&self, email: &str) -> Result<Vec<Food>>;

    /// Listings whose requester `email` equals `email`.
    async fn find_by_requester(&self, email: &str) -> Result<Vec<Food>>;

    async fn insert_one(&self, listing: &FoodListing) -> Result<InsertResult>;

    /// Set the request fields named by `change` on one listing.
    async fn update_status(&self, id: FoodId, change: &StatusChange) -> Result<UpdateResult>;

    /// Overwrite every listing field, inserting under `id` when it does not exist.
    async fn replace(&self, id: FoodId, listing: &FoodListing) -> Result<UpdateResult>;

    async fn delete_one(&self, id: FoodId) -> Result<DeleteResult>;

    /// Release connections; called once after the server stops.
    async fn close(&self);
}
