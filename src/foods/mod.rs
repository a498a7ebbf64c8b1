//! The food listings collection: models, filters and the storage backends.

pub mod filter;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use filter::{AvailableFilter, AvailableQuery, SortOrder};
pub use memory::MemoryFoodStore;
pub use models::{
    parse_timestamp, Donator, Food, FoodId, FoodListing, FoodStatus, InvalidFoodId,
    RequestDetails, StatusChange, Timestamp,
};
pub use postgres::PgFoodStore;
pub use store::{DeleteResult, FoodStore, InsertResult, StorageError, UpdateResult};
