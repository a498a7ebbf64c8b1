use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::foods::{models::deserialize_timestamp, FoodStatus, RequestDetails, StatusChange, Timestamp};

/// Body of the cancel endpoint. A missing `email` clears the requester.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CancelRequest {
    pub status: FoodStatus,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<CancelRequest> for StatusChange {
    fn from(request: CancelRequest) -> Self {
        Self {
            status: request.status,
            email: request.email,
            details: None,
        }
    }
}

/// Body of the request endpoint.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FoodsRequest {
    /// Pickup notes; `additionalNotes` is accepted too.
    #[serde(default, alias = "additionalNotes")]
    pub additional: Option<String>,
    pub status: FoodStatus,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    #[schema(value_type = Option<String>)]
    pub requested_date: Option<Timestamp>,
}

impl From<FoodsRequest> for StatusChange {
    fn from(request: FoodsRequest) -> Self {
        Self {
            status: request.status,
            email: request.email,
            details: Some(RequestDetails {
                additional_notes: request.additional,
                requested_date: request.requested_date,
            }),
        }
    }
}
