//! PostgreSQL-backed `foods` collection.
//!
//! Each listing is one row; the donator sub-document is flattened into
//! `donator_*` columns. Queries mirror the document-store semantics the web
//! client relies on: missing values sort lowest, updates report matched and
//! modified counts separately, and a full replace upserts.

use async_trait::async_trait;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    FromRow, PgPool, Row,
};
use std::time::Duration;
use tracing::{info_span, Instrument, Span};

use super::{
    filter::{AvailableFilter, SortOrder},
    models::{Donator, Food, FoodId, FoodListing, FoodStatus, StatusChange, Timestamp},
    store::{DeleteResult, FoodStore, InsertResult, Result, UpdateResult},
};

pub const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const FOOD_COLUMNS: &str = "id, food_name, food_image, food_quantity, pickup_location, \
     expired_date_time, expired_date_time_text, additional_notes, status, donator_image, \
     donator_name, donator_email, email, requested_date, requested_date_text";

impl<'r> FromRow<'r, PgRow> for Food {
    fn from_row(row: &'r PgRow) -> std::result::Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let id: uuid::Uuid = row.try_get("id")?;
        Ok(Self {
            id: FoodId::from(id),
            food_name: row.try_get("food_name")?,
            food_image: row.try_get("food_image")?,
            food_quantity: row.try_get("food_quantity")?,
            pickup_location: row.try_get("pickup_location")?,
            expired_date_time: Timestamp::from_columns(
                row.try_get("expired_date_time_text")?,
                row.try_get("expired_date_time")?,
            ),
            additional_notes: row.try_get("additional_notes")?,
            status: FoodStatus::from_db(&status)?,
            donator: Donator::from_parts(
                row.try_get("donator_image")?,
                row.try_get("donator_name")?,
                row.try_get("donator_email")?,
            ),
            email: row.try_get("email")?,
            requested_date: Timestamp::from_columns(
                row.try_get("requested_date_text")?,
                row.try_get("requested_date")?,
            ),
        })
    }
}

fn db_span(operation: &'static str, statement: &str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

#[derive(Debug, Clone)]
pub struct PgFoodStore {
    pool: PgPool,
}

impl PgFoodStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the connection pool used by the server.
    ///
    /// # Errors
    /// Returns an error if no connection can be established.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the `foods` table and its indexes if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if the schema statements fail.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(db_span("CREATE", "schema.sql"))
            .await?;
        Ok(())
    }

    async fn fetch_where(&self, clause: &str, value: &str) -> Result<Vec<Food>> {
        let query = format!("SELECT {FOOD_COLUMNS} FROM foods WHERE {clause} ORDER BY created_at");
        let rows = sqlx::query_as::<_, Food>(&query)
            .bind(value)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl FoodStore for PgFoodStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .instrument(db_span("PING", "SELECT 1"))
            .await?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Food>> {
        let query = format!(
            "SELECT {FOOD_COLUMNS} FROM foods ORDER BY food_quantity DESC NULLS LAST, created_at"
        );
        let rows = sqlx::query_as::<_, Food>(&query)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        Ok(rows)
    }

    async fn find_one(&self, id: FoodId) -> Result<Option<Food>> {
        let query = format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1");
        let row = sqlx::query_as::<_, Food>(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        Ok(row)
    }

    async fn find_available(&self, filter: &AvailableFilter) -> Result<Vec<Food>> {
        let pattern = filter.name_pattern();

        let mut query = format!("SELECT {FOOD_COLUMNS} FROM foods WHERE status = $1");
        if pattern.is_some() {
            query.push_str(" AND food_name ILIKE $2 ESCAPE '\\'");
        }
        query.push_str(match filter.expiry_order {
            Some(SortOrder::Ascending) => " ORDER BY expired_date_time ASC NULLS FIRST, created_at",
            Some(SortOrder::Descending) => {
                " ORDER BY expired_date_time DESC NULLS LAST, created_at"
            }
            None => " ORDER BY created_at",
        });

        let mut statement = sqlx::query_as::<_, Food>(&query).bind(filter.status.as_str());
        if let Some(pattern) = pattern {
            statement = statement.bind(pattern);
        }
        let rows = statement
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await?;
        Ok(rows)
    }

    async fn find_by_donator(&self, email: &str) -> Result<Vec<Food>> {
        self.fetch_where("donator_email = $1", email).await
    }

    async fn find_by_requester(&self, email: &str) -> Result<Vec<Food>> {
        self.fetch_where("email = $1", email).await
    }

    async fn insert_one(&self, listing: &FoodListing) -> Result<InsertResult> {
        let id = FoodId::new();
        let donator = listing.donator.clone().unwrap_or_default();
        let query = r"
            INSERT INTO foods
                (id, food_name, food_image, food_quantity, pickup_location, expired_date_time,
                 expired_date_time_text, additional_notes, status, donator_image, donator_name,
                 donator_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        ";
        sqlx::query(query)
            .bind(id.as_uuid())
            .bind(&listing.food_name)
            .bind(&listing.food_image)
            .bind(listing.food_quantity)
            .bind(&listing.pickup_location)
            .bind(listing.expired_date_time.as_ref().map(Timestamp::instant))
            .bind(listing.expired_date_time.as_ref().map(Timestamp::as_str))
            .bind(&listing.additional_notes)
            .bind(listing.status.as_str())
            .bind(&donator.donator_image)
            .bind(&donator.donator_name)
            .bind(&donator.donator_email)
            .execute(&self.pool)
            .instrument(db_span("INSERT", query))
            .await?;
        Ok(InsertResult::new(id))
    }

    async fn update_status(&self, id: FoodId, change: &StatusChange) -> Result<UpdateResult> {
        // `target` counts the match, `changed` only rows whose values differ.
        let row = match &change.details {
            None => {
                let query = r"
                    WITH target AS (
                        SELECT id FROM foods WHERE id = $1
                    ), changed AS (
                        UPDATE foods SET status = $2, email = $3
                        WHERE id IN (SELECT id FROM target)
                          AND (status, email) IS DISTINCT FROM ($2, $3)
                        RETURNING id
                    )
                    SELECT (SELECT COUNT(*) FROM target) AS matched,
                           (SELECT COUNT(*) FROM changed) AS modified
                ";
                sqlx::query(query)
                    .bind(id.as_uuid())
                    .bind(change.status.as_str())
                    .bind(&change.email)
                    .fetch_one(&self.pool)
                    .instrument(db_span("UPDATE", query))
                    .await?
            }
            Some(details) => {
                let query = r"
                    WITH target AS (
                        SELECT id FROM foods WHERE id = $1
                    ), changed AS (
                        UPDATE foods
                        SET status = $2, email = $3, additional_notes = $4,
                            requested_date = $5, requested_date_text = $6
                        WHERE id IN (SELECT id FROM target)
                          AND (status, email, additional_notes, requested_date, requested_date_text)
                              IS DISTINCT FROM ($2, $3, $4, $5, $6)
                        RETURNING id
                    )
                    SELECT (SELECT COUNT(*) FROM target) AS matched,
                           (SELECT COUNT(*) FROM changed) AS modified
                ";
                sqlx::query(query)
                    .bind(id.as_uuid())
                    .bind(change.status.as_str())
                    .bind(&change.email)
                    .bind(&details.additional_notes)
                    .bind(details.requested_date.as_ref().map(Timestamp::instant))
                    .bind(details.requested_date.as_ref().map(Timestamp::as_str))
                    .fetch_one(&self.pool)
                    .instrument(db_span("UPDATE", query))
                    .await?
            }
        };

        let matched: i64 = row.try_get("matched")?;
        let modified: i64 = row.try_get("modified")?;
        Ok(if matched == 0 {
            UpdateResult::unmatched()
        } else {
            UpdateResult::matched(modified > 0)
        })
    }

    async fn replace(&self, id: FoodId, listing: &FoodListing) -> Result<UpdateResult> {
        let donator = listing.donator.clone().unwrap_or_default();
        // The conflict branch only writes when something differs, so `written` is
        // the modified count for an existing row and the upsert count otherwise.
        let query = r"
            WITH existing AS (
                SELECT id FROM foods WHERE id = $1
            ), written AS (
                INSERT INTO foods
                    (id, food_name, food_image, food_quantity, pickup_location, expired_date_time,
                     expired_date_time_text, additional_notes, status, donator_image,
                     donator_name, donator_email)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (id) DO UPDATE SET
                    food_name = EXCLUDED.food_name,
                    food_image = EXCLUDED.food_image,
                    food_quantity = EXCLUDED.food_quantity,
                    pickup_location = EXCLUDED.pickup_location,
                    expired_date_time = EXCLUDED.expired_date_time,
                    expired_date_time_text = EXCLUDED.expired_date_time_text,
                    additional_notes = EXCLUDED.additional_notes,
                    status = EXCLUDED.status,
                    donator_image = EXCLUDED.donator_image,
                    donator_name = EXCLUDED.donator_name,
                    donator_email = EXCLUDED.donator_email
                WHERE (foods.food_name, foods.food_image, foods.food_quantity,
                       foods.pickup_location, foods.expired_date_time,
                       foods.expired_date_time_text, foods.additional_notes, foods.status,
                       foods.donator_image, foods.donator_name, foods.donator_email)
                      IS DISTINCT FROM
                      (EXCLUDED.food_name, EXCLUDED.food_image, EXCLUDED.food_quantity,
                       EXCLUDED.pickup_location, EXCLUDED.expired_date_time,
                       EXCLUDED.expired_date_time_text, EXCLUDED.additional_notes,
                       EXCLUDED.status, EXCLUDED.donator_image, EXCLUDED.donator_name,
                       EXCLUDED.donator_email)
                RETURNING id
            )
            SELECT (SELECT COUNT(*) FROM existing) AS matched,
                   (SELECT COUNT(*) FROM written) AS written
        ";
        let row = sqlx::query(query)
            .bind(id.as_uuid())
            .bind(&listing.food_name)
            .bind(&listing.food_image)
            .bind(listing.food_quantity)
            .bind(&listing.pickup_location)
            .bind(listing.expired_date_time.as_ref().map(Timestamp::instant))
            .bind(listing.expired_date_time.as_ref().map(Timestamp::as_str))
            .bind(&listing.additional_notes)
            .bind(listing.status.as_str())
            .bind(&donator.donator_image)
            .bind(&donator.donator_name)
            .bind(&donator.donator_email)
            .fetch_one(&self.pool)
            .instrument(db_span("UPSERT", query))
            .await?;

        let matched: i64 = row.try_get("matched")?;
        let written: i64 = row.try_get("written")?;
        Ok(match (matched, written) {
            (0, 0) => UpdateResult::unmatched(),
            (0, _) => UpdateResult::upserted(id),
            (_, written) => UpdateResult::matched(written > 0),
        })
    }

    async fn delete_one(&self, id: FoodId) -> Result<DeleteResult> {
        let query = "DELETE FROM foods WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await?;
        Ok(DeleteResult::new(result.rows_affected()))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
