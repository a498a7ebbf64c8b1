//! The single error boundary of the HTTP API.
//!
//! Every handler returns `Result<_, ApiError>`; each variant renders as a JSON
//! `{"message": ...}` body with the matching status code.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::foods::{InvalidFoodId, StorageError};

pub const UNAUTHORIZED: &str = "UnAuthorized";
pub const INVALID_TOKEN: &str = "invalid access";
pub const IDENTITY_MISMATCH: &str = "invalid access || unAuthorized";

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing token")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<InvalidFoodId> for ApiError {
    fn from(err: InvalidFoodId) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED.to_string()),
            Self::Forbidden(message) => (StatusCode::FORBIDDEN, message.to_string()),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Storage(err) => {
                error!("Storage operation failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Self::Internal(err) => {
                error!("Request failed: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> anyhow::Result<(StatusCode, ErrorResponse)> {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&body)?))
    }

    #[tokio::test]
    async fn auth_errors_use_client_messages() -> anyhow::Result<()> {
        let (status, body) = render(ApiError::Unauthorized).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.message, "UnAuthorized");

        let (status, body) = render(ApiError::Forbidden(IDENTITY_MISMATCH)).await?;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.message, "invalid access || unAuthorized");
        Ok(())
    }

    #[tokio::test]
    async fn storage_details_are_not_leaked() -> anyhow::Result<()> {
        let err = ApiError::from(StorageError::Database(sqlx::Error::PoolTimedOut));
        let (status, body) = render(err).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_id_is_bad_request() -> anyhow::Result<()> {
        let err = ApiError::from(InvalidFoodId("nope".to_string()));
        let (status, body) = render(err).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "invalid food id: nope");
        Ok(())
    }
}
