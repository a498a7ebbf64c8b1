use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{cmp::Ordering, fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Storage-assigned listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct FoodId(Uuid);

impl FoodId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for FoodId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FoodId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for FoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid food id: {0}")]
pub struct InvalidFoodId(pub String);

impl FromStr for FoodId {
    type Err = InvalidFoodId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| InvalidFoodId(value.to_string()))
    }
}

/// Lifecycle of a listing. Transitions are informal: any value may be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FoodStatus {
    #[default]
    Available,
    Requested,
    Cancelled,
    Completed,
}

impl FoodStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Requested => "requested",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Parse the persisted `foods.status` textual value into a typed enum.
    pub(crate) fn from_db(value: &str) -> Result<Self, sqlx::Error> {
        match value {
            "available" => Ok(Self::Available),
            "requested" => Ok(Self::Requested),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid foods.status value: {value}"),
            )))),
        }
    }
}

/// The user who published a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Donator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donator_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donator_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donator_email: Option<String>,
}

impl Donator {
    /// Rebuild from flattened columns; all-empty means no donator was stored.
    pub(crate) fn from_parts(
        donator_image: Option<String>,
        donator_name: Option<String>,
        donator_email: Option<String>,
    ) -> Option<Self> {
        if donator_image.is_none() && donator_name.is_none() && donator_email.is_none() {
            None
        } else {
            Some(Self {
                donator_image,
                donator_name,
                donator_email,
            })
        }
    }
}

/// Listing fields supplied by the client on create and full replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoodListing {
    pub food_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "2024-06-10T18:00")]
    pub expired_date_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    #[serde(default)]
    pub status: FoodStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donator: Option<Donator>,
}

/// A stored listing as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    #[serde(rename = "_id")]
    pub id: FoodId,
    pub food_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_location: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "2024-06-10T18:00")]
    pub expired_date_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
    pub status: FoodStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donator: Option<Donator>,
    /// Requester email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub requested_date: Option<Timestamp>,
}

impl Food {
    #[must_use]
    pub fn from_listing(id: FoodId, listing: FoodListing) -> Self {
        Self {
            id,
            food_name: listing.food_name,
            food_image: listing.food_image,
            food_quantity: listing.food_quantity,
            pickup_location: listing.pickup_location,
            expired_date_time: listing.expired_date_time,
            additional_notes: listing.additional_notes,
            status: listing.status,
            donator: listing.donator,
            email: None,
            requested_date: None,
        }
    }

    /// Overwrite every client-editable field; requester fields are kept.
    pub fn replace_listing(&mut self, listing: FoodListing) {
        self.food_name = listing.food_name;
        self.food_image = listing.food_image;
        self.food_quantity = listing.food_quantity;
        self.pickup_location = listing.pickup_location;
        self.expired_date_time = listing.expired_date_time;
        self.additional_notes = listing.additional_notes;
        self.status = listing.status;
        self.donator = listing.donator;
    }

    #[must_use]
    pub fn donator_email(&self) -> Option<&str> {
        self.donator
            .as_ref()
            .and_then(|donator| donator.donator_email.as_deref())
    }
}

/// Fields written when a listing is requested or a request is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: FoodStatus,
    pub email: Option<String>,
    /// `None` leaves notes and request date untouched (cancel); `Some` overwrites them.
    pub details: Option<RequestDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDetails {
    pub additional_notes: Option<String>,
    pub requested_date: Option<Timestamp>,
}

/// A client-supplied point in time.
///
/// Keeps the text exactly as submitted, which is what gets serialized back, next to
/// the instant it denotes. Ordering follows the instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    text: String,
    instant: DateTime<Utc>,
}

impl Timestamp {
    /// `None` when `value` is not in one of the formats [`parse_timestamp`] accepts.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        parse_timestamp(value).map(|instant| Self {
            text: value.to_string(),
            instant,
        })
    }

    /// Timestamp with no submitted text, rendered as RFC 3339 in UTC.
    #[must_use]
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self {
            text: instant.to_rfc3339_opts(SecondsFormat::Secs, true),
            instant,
        }
    }

    /// Rebuild from the stored text and instant columns. Rows written before the
    /// text column existed only carry the instant.
    pub(crate) fn from_columns(text: Option<String>, instant: Option<DateTime<Utc>>) -> Option<Self> {
        match (text, instant) {
            (Some(text), Some(instant)) => Some(Self { text, instant }),
            (Some(text), None) => Self::parse(&text),
            (None, instant) => instant.map(Self::from_instant),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant
            .cmp(&other.instant)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

/// Accepts RFC 3339 as well as the zone-less `datetime-local` format browsers submit
/// (`2024-05-20T10:30`), which is read as UTC. A bare date means midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Optional timestamp field: absent, `null` and blank strings all mean "not set".
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(value) if !value.trim().is_empty() => Timestamp::parse(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {value}"))),
        _ => Ok(None),
    }
}
