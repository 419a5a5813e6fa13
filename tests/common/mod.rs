#![allow(dead_code)]

use axum::body::Body;
use http_body_util::BodyExt;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

use journal::config::Config;
use journal::AppState;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        journal::db::MIGRATOR
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let config = Config::from_lookup(|name| match name {
            "JWT_SECRET" => Some("test-secret".to_string()),
            "BCRYPT_COST" => Some("4".to_string()),
            _ => None,
        })
        .expect("Test config should be valid");

        let state = AppState::new(pool.clone(), &config);
        let router = journal::build_app(state.clone());

        Self {
            router,
            db: pool,
            state,
        }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Register a user over HTTP and return its id.
    pub async fn register(&self, username: &str, password: &str) -> String {
        let body = serde_json::json!({ "username": username, "password": password });
        let resp = self.post_json("/register", &body, None).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        body_json(resp).await["id"].as_str().unwrap().to_string()
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let resp = self
            .post_form("/token", &format!("username={username}&password={password}"))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["token_type"], "bearer");
        json["access_token"].as_str().unwrap().to_string()
    }

    /// Register and log in; returns (user_id, token).
    pub async fn create_user(&self, username: &str) -> (String, String) {
        let id = self.register(username, "password123").await;
        let token = self.login(username, "password123").await;
        (id, token)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let req = with_token(Request::builder().uri(uri), token)
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response {
        let req = with_token(Request::builder().uri(uri).method("DELETE"), token)
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }

    pub async fn post_json(&self, uri: &str, body: &Value, token: Option<&str>) -> Response {
        self.send_json("POST", uri, body, token).await
    }

    pub async fn put_json(&self, uri: &str, body: &Value, token: Option<&str>) -> Response {
        self.send_json("PUT", uri, body, token).await
    }

    async fn send_json(&self, method: &str, uri: &str, body: &Value, token: Option<&str>) -> Response {
        let builder = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json");
        let req = with_token(builder, token)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    /// Send a POST form request (no authentication).
    pub async fn post_form(&self, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    /// Row count of a table, for checking what a request left behind.
    pub async fn count(&self, table: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&self.db)
            .await
            .unwrap();
        n
    }
}

fn with_token(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header("authorization", format!("Bearer {token}")),
        None => builder,
    }
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Names of the tags in an entry response, sorted.
pub fn tag_names(entry: &Value) -> Vec<String> {
    let mut names: Vec<String> = entry["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

/// Contents of the gratitude items in an entry response, sorted.
pub fn gratitude(entry: &Value) -> Vec<String> {
    let mut items: Vec<String> = entry["gratitude_items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["content"].as_str().unwrap().to_string())
        .collect();
    items.sort();
    items
}
