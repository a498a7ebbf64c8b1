use crate::foods::FoodStore;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method, Request},
    middleware,
    routing::{get, options, patch},
    Extension, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;

pub use error::{ApiError, ErrorResponse};
pub use handlers::auth::{AuthConfig, AuthState, Claims, Environment};
pub use openapi::openapi;

/// Build the application router around an already constructed store.
#[must_use]
pub fn app(store: Arc<dyn FoodStore>, auth_state: Arc<AuthState>, origins: Vec<HeaderValue>) -> Router {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true);

    let (public, _openapi) = openapi::public_router().split_for_parts();
    let (protected, _openapi) = openapi::protected_router().split_for_parts();
    let protected = protected.route_layer(middleware::from_fn(handlers::auth::require_token));

    public
        .merge(protected)
        .route("/", get(handlers::root::root))
        .route("/health", options(handlers::health::health))
        // misspelled paths still used by deployed clients
        .route("/availbleFoods", get(handlers::foods::available_foods))
        .route("/calcelRequest/:id", patch(handlers::foods::cancel_request))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(auth_state))
                .layer(Extension(store)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    store: Arc<dyn FoodStore>,
    auth_config: AuthConfig,
    cors_origins: &[String],
) -> Result<()> {
    let origins = cors_origins
        .iter()
        .map(|origin| allowed_origin(origin))
        .collect::<Result<Vec<_>>>()?;
    let auth_state = Arc::new(AuthState::new(auth_config));

    let app = app(store.clone(), auth_state, origins);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Store closed");

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

/// Normalize a configured origin (`scheme://host[:port]`, no path) into a header value.
fn allowed_origin(origin: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(origin.trim()).with_context(|| format!("Invalid CORS origin: {origin}"))?;
    let host = parsed
        .host_str()
        .with_context(|| format!("CORS origin must include a host: {origin}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    HeaderValue::from_str(&format!("{}://{}{}", parsed.scheme(), host, port))
        .context("Failed to build CORS origin header")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_normalized() -> Result<()> {
        assert_eq!(allowed_origin("http://localhost:5173/")?, "http://localhost:5173");
        assert_eq!(
            allowed_origin(" https://foodshare.web.app/login ")?,
            "https://foodshare.web.app"
        );
        assert!(allowed_origin("not a url").is_err());
        Ok(())
    }
}
