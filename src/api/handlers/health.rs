use crate::{foods::FoodStore, GIT_COMMIT_HASH};
use axum::{
    body::Body,
    extract::Extension,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    store: String,
}

impl Health {
    /// `name:version:short-commit`, sent as the `X-App` header.
    fn app_header(&self) -> Option<HeaderValue> {
        let short_hash = self.commit.get(..7).unwrap_or_default();
        format!("{}:{}:{}", self.name, self.version, short_hash)
            .parse::<HeaderValue>()
            .map_err(|err| error!("Failed to parse X-App header: {}", err))
            .ok()
    }
}

#[utoipa::path(
    get,
    path= "/health",
    responses (
        (status = 200, description = "Store is reachable", body = Health),
        (status = 503, description = "Store is unreachable", body = Health)
    ),
    tag= "health"
)]
// axum handler for health; also answers `OPTIONS /health` with an empty body
pub async fn health(method: Method, store: Extension<Arc<dyn FoodStore>>) -> impl IntoResponse {
    let reachable = match store.ping().await {
        Ok(()) => true,
        Err(err) => {
            error!("Failed to ping store: {}", err);
            false
        }
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if reachable { "ok" } else { "error" }.to_string(),
    };

    let mut headers = HeaderMap::new();
    if let Some(value) = health.app_header() {
        debug!("X-App header: {:?}", value);
        headers.insert("X-App", value);
    }

    let body = if method == Method::GET {
        Json(&health).into_response()
    } else {
        Body::empty().into_response()
    };

    let status = if reachable {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, headers, body)
}
