//! Black-box test: the production router on an ephemeral port, driven over HTTP.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use foodshare::{
    api::{self, AuthConfig, AuthState},
    foods::{FoodStore, MemoryFoodStore},
};
use reqwest::{header::SET_COOKIE, StatusCode};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        let store: Arc<dyn FoodStore> = Arc::new(MemoryFoodStore::new());
        let auth = Arc::new(AuthState::new(AuthConfig::new(SecretString::from(
            "black-box-secret".to_string(),
        ))));
        let app = api::app(
            store,
            auth,
            vec![HeaderValue::from_static("http://localhost:5173")],
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { base_url, handle })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn login(client: &reqwest::Client, srv: &TestServer, email: &str) -> Result<String> {
    let res = client
        .post(srv.url("/jwt"))
        .json(&json!({ "email": email }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
        .context("missing token cookie")?;
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "success": true }));
    Ok(cookie)
}

fn names(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(|item| item["foodName"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn donate_request_and_track() -> Result<()> {
    let srv = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/addFood"))
        .json(&json!({
            "foodName": "Bread",
            "foodQuantity": 4,
            "status": "available",
            "donator": { "donatorName": "Ann", "donatorEmail": "a@x.com" }
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let inserted: Value = res.json().await?;
    let id = inserted["insertedId"]
        .as_str()
        .context("missing insertedId")?
        .to_string();

    let food: Value = client
        .get(srv.url(&format!("/featuredFoods/{id}")))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(food["foodName"], "Bread");
    assert_eq!(food["status"], "available");

    let updated: Value = client
        .patch(srv.url(&format!("/foodsRequest/{id}")))
        .json(&json!({
            "additional": "evening pickup",
            "status": "requested",
            "email": "b@y.com",
            "requestedDate": "2024-06-01T09:00"
        }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(updated["matchedCount"], 1);
    assert_eq!(updated["modifiedCount"], 1);

    let cookie = login(&client, &srv, "b@y.com").await?;
    let res = client
        .get(srv.url("/myRequestedFoods/b@y.com"))
        .header("Cookie", &cookie)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let requested: Value = res.json().await?;
    assert_eq!(names(&requested), ["Bread"]);

    let available: Value = client
        .get(srv.url("/availableFoods"))
        .send()
        .await?
        .json()
        .await?;
    assert!(names(&available).is_empty());

    // the donator's token cannot read the requester's list
    let donator_cookie = login(&client, &srv, "a@x.com").await?;
    let res = client
        .get(srv.url("/myRequestedFoods/b@y.com"))
        .header("Cookie", &donator_cookie)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let mine: Value = client
        .get(srv.url("/manageMyFoods/a@x.com"))
        .header("Cookie", &donator_cookie)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(names(&mine), ["Bread"]);
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() -> Result<()> {
    let srv = TestServer::spawn().await?;
    let client = reqwest::Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, srv.url("/addFood"))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("http://localhost:5173")
    );
    assert_eq!(
        res.headers()
            .get("access-control-allow-credentials")
            .and_then(|value| value.to_str().ok()),
        Some("true")
    );
    Ok(())
}

#[tokio::test]
async fn docs_are_served() -> Result<()> {
    let srv = TestServer::spawn().await?;
    let doc: Value = reqwest::get(srv.url("/api-docs/openapi.json"))
        .await?
        .json()
        .await?;
    assert_eq!(doc["info"]["title"], "foodshare");
    assert!(doc["paths"]["/manageMyFoods/{email}"].is_object());
    Ok(())
}
