use axum::response::IntoResponse;

pub const ROOT_MESSAGE: &str = "The food sharing server is running !";

// liveness banner, kept for clients that probe `/`
pub async fn root() -> impl IntoResponse {
    ROOT_MESSAGE
}
