use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    filter::AvailableFilter,
    models::{Food, FoodId, FoodListing, StatusChange},
    store::{DeleteResult, FoodStore, InsertResult, Result, UpdateResult},
};

/// In-memory store (useful for testing and running without a database).
///
/// Listings are kept in insertion order, which is also the order of unsorted results.
#[derive(Debug, Default)]
pub struct MemoryFoodStore {
    foods: RwLock<Vec<Food>>,
}

impl MemoryFoodStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing listings.
    #[must_use]
    pub fn with_foods(foods: Vec<Food>) -> Self {
        Self {
            foods: RwLock::new(foods),
        }
    }

    async fn find_where<F>(&self, predicate: F) -> Vec<Food>
    where
        F: Fn(&Food) -> bool,
    {
        let foods = self.foods.read().await;
        foods.iter().filter(|food| predicate(food)).cloned().collect()
    }
}

#[async_trait]
impl FoodStore for MemoryFoodStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Food>> {
        let mut foods = self.foods.read().await.clone();
        // stable: equal quantities keep insertion order
        foods.sort_by(|left, right| right.food_quantity.cmp(&left.food_quantity));
        Ok(foods)
    }

    async fn find_one(&self, id: FoodId) -> Result<Option<Food>> {
        let foods = self.foods.read().await;
        Ok(foods.iter().find(|food| food.id == id).cloned())
    }

    async fn find_available(&self, filter: &AvailableFilter) -> Result<Vec<Food>> {
        let mut foods = self.find_where(|food| filter.matches(food)).await;
        foods.sort_by(|left, right| filter.compare(left, right));
        Ok(foods)
    }

    async fn find_by_donator(&self, email: &str) -> Result<Vec<Food>> {
        Ok(self
            .find_where(|food| food.donator_email() == Some(email))
            .await)
    }

    async fn find_by_requester(&self, email: &str) -> Result<Vec<Food>> {
        Ok(self
            .find_where(|food| food.email.as_deref() == Some(email))
            .await)
    }

    async fn insert_one(&self, listing: &FoodListing) -> Result<InsertResult> {
        let id = FoodId::new();
        self.foods
            .write()
            .await
            .push(Food::from_listing(id, listing.clone()));
        debug!(%id, "inserted food listing");
        Ok(InsertResult::new(id))
    }

    async fn update_status(&self, id: FoodId, change: &StatusChange) -> Result<UpdateResult> {
        let mut foods = self.foods.write().await;
        let Some(food) = foods.iter_mut().find(|food| food.id == id) else {
            return Ok(UpdateResult::unmatched());
        };

        let before = food.clone();
        food.status = change.status;
        food.email.clone_from(&change.email);
        if let Some(details) = &change.details {
            food.additional_notes.clone_from(&details.additional_notes);
            food.requested_date.clone_from(&details.requested_date);
        }
        Ok(UpdateResult::matched(*food != before))
    }

    async fn replace(&self, id: FoodId, listing: &FoodListing) -> Result<UpdateResult> {
        let mut foods = self.foods.write().await;
        if let Some(food) = foods.iter_mut().find(|food| food.id == id) {
            let before = food.clone();
            food.replace_listing(listing.clone());
            return Ok(UpdateResult::matched(*food != before));
        }

        foods.push(Food::from_listing(id, listing.clone()));
        debug!(%id, "upserted food listing");
        Ok(UpdateResult::upserted(id))
    }

    async fn delete_one(&self, id: FoodId) -> Result<DeleteResult> {
        let mut foods = self.foods.write().await;
        let before = foods.len();
        if let Some(index) = foods.iter().position(|food| food.id == id) {
            foods.remove(index);
        }
        Ok(DeleteResult::new((before - foods.len()) as u64))
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foods::{
        filter::AvailableQuery,
        models::{Donator, FoodStatus, RequestDetails, Timestamp},
    };
    use chrono::{TimeZone, Utc};

    fn listing(name: &str, quantity: i64) -> FoodListing {
        FoodListing {
            food_name: name.to_string(),
            food_quantity: Some(quantity),
            pickup_location: Some("Main St".to_string()),
            donator: Some(Donator {
                donator_email: Some("a@x.com".to_string()),
                ..Donator::default()
            }),
            ..FoodListing::default()
        }
    }

    #[tokio::test]
    async fn find_all_orders_by_quantity_desc() -> anyhow::Result<()> {
        let store = MemoryFoodStore::new();
        store.insert_one(&listing("Few", 1)).await?;
        store.insert_one(&listing("Many", 40)).await?;
        store.insert_one(&listing("Some", 7)).await?;

        let names: Vec<_> = store
            .find_all()
            .await?
            .into_iter()
            .map(|food| food.food_name)
            .collect();
        assert_eq!(names, ["Many", "Some", "Few"]);
        Ok(())
    }

    #[tokio::test]
    async fn update_status_reports_modified_only_on_change() -> anyhow::Result<()> {
        let store = MemoryFoodStore::new();
        let id = store.insert_one(&listing("Bread", 5)).await?.inserted_id;
        let change = StatusChange {
            status: FoodStatus::Requested,
            email: Some("b@y.com".to_string()),
            details: None,
        };

        let first = store.update_status(id, &change).await?;
        assert_eq!((first.matched_count, first.modified_count), (1, 1));
        let second = store.update_status(id, &change).await?;
        assert_eq!((second.matched_count, second.modified_count), (1, 0));

        let missing = store.update_status(FoodId::new(), &change).await?;
        assert_eq!(missing, UpdateResult::unmatched());
        Ok(())
    }

    #[tokio::test]
    async fn cancel_leaves_request_details_untouched() -> anyhow::Result<()> {
        let store = MemoryFoodStore::new();
        let id = store.insert_one(&listing("Bread", 5)).await?.inserted_id;
        let requested_date = Timestamp::parse("2024-06-01T09:00");
        store
            .update_status(
                id,
                &StatusChange {
                    status: FoodStatus::Requested,
                    email: Some("b@y.com".to_string()),
                    details: Some(RequestDetails {
                        additional_notes: Some("after 5pm".to_string()),
                        requested_date: requested_date.clone(),
                    }),
                },
            )
            .await?;
        store
            .update_status(
                id,
                &StatusChange {
                    status: FoodStatus::Available,
                    email: None,
                    details: None,
                },
            )
            .await?;

        let food = store.find_one(id).await?;
        assert_eq!(food.as_ref().map(|f| f.status), Some(FoodStatus::Available));
        assert_eq!(food.as_ref().and_then(|f| f.email.clone()), None);
        assert_eq!(
            food.as_ref().and_then(|f| f.additional_notes.clone()),
            Some("after 5pm".to_string())
        );
        assert_eq!(food.and_then(|f| f.requested_date), requested_date);
        Ok(())
    }

    #[tokio::test]
    async fn replace_upserts_unknown_id() -> anyhow::Result<()> {
        let store = MemoryFoodStore::new();
        let id = FoodId::new();
        let result = store.replace(id, &listing("Soup", 3)).await?;
        assert_eq!(result, UpdateResult::upserted(id));
        assert!(store.find_one(id).await?.is_some());

        let again = store.replace(id, &listing("Soup", 3)).await?;
        assert_eq!(again, UpdateResult::matched(false));
        Ok(())
    }

    #[tokio::test]
    async fn find_available_filters_and_sorts() -> anyhow::Result<()> {
        let store = MemoryFoodStore::new();
        for (name, day, status) in [
            ("Bread rolls", 3, FoodStatus::Available),
            ("Rye bread", 1, FoodStatus::Available),
            ("Breadsticks", 2, FoodStatus::Requested),
            ("Apples", 4, FoodStatus::Available),
        ] {
            store
                .insert_one(&FoodListing {
                    status,
                    expired_date_time: Utc
                        .with_ymd_and_hms(2024, 6, day, 0, 0, 0)
                        .single()
                        .map(Timestamp::from_instant),
                    ..listing(name, 1)
                })
                .await?;
        }

        let filter = AvailableFilter::from_query(&AvailableQuery {
            sort: Some("asc".to_string()),
            search: Some("bread".to_string()),
        });
        let names: Vec<_> = store
            .find_available(&filter)
            .await?
            .into_iter()
            .map(|food| food.food_name)
            .collect();
        assert_eq!(names, ["Rye bread", "Bread rolls"]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_one_counts_removed() -> anyhow::Result<()> {
        let store = MemoryFoodStore::new();
        let id = store.insert_one(&listing("Bread", 5)).await?.inserted_id;
        assert_eq!(store.delete_one(id).await?.deleted_count, 1);
        assert_eq!(store.delete_one(id).await?.deleted_count, 0);
        assert_eq!(store.find_one(id).await?, None);
        Ok(())
    }
}
