#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use askbox_api::auth::jwt::JwtConfig;
use askbox_api::config::{SearchSettings, ServerConfig, StoreBackend};
use askbox_api::router::build_app_router;
use askbox_api::state::AppState;
use askbox_db::memory::{MemoryContentStore, MemoryJobQueue};
use askbox_search::{MemoryIndex, SearchIndex, DEFAULT_INDEX};
use askbox_worker::{ExportConfig, ExportWorker};
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(export_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
        },
        store_backend: StoreBackend::Memory,
        search: SearchSettings {
            url: None,
            index: DEFAULT_INDEX.to_string(),
            timeout: Duration::from_secs(5),
            reconcile_interval: None,
        },
        export: ExportConfig {
            export_dir,
            job_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(50),
            ..ExportConfig::default()
        },
        export_retention_hours: 24,
        embedded_worker: false,
    }
}

/// The router plus direct handles on the in-process backends behind it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryContentStore>,
    pub queue: Arc<MemoryJobQueue>,
    /// Drives export jobs on demand via [`ExportWorker::run_once`].
    pub worker: ExportWorker,
    _export_dir: tempfile::TempDir,
}

impl TestApp {
    /// A fresh clone of the router for one `oneshot` call.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with the in-process index.
pub fn build_test_app() -> (TestApp, Arc<MemoryIndex>) {
    let index = Arc::new(MemoryIndex::new());
    let app = build_test_app_with_search(index.clone());
    (app, index)
}

/// Build the full application router over in-process backends with the
/// given search index. Uses the same [`build_app_router`] as production.
pub fn build_test_app_with_search(search: Arc<dyn SearchIndex>) -> TestApp {
    let export_dir = tempfile::tempdir().expect("tempdir should be created");
    let config = test_config(export_dir.path().to_path_buf());
    let store = Arc::new(MemoryContentStore::new());
    let queue = Arc::new(MemoryJobQueue::new());

    let state = AppState {
        store: store.clone(),
        search,
        jobs: queue.clone(),
        config: Arc::new(config.clone()),
    };
    let worker = ExportWorker::new(store.clone(), queue.clone(), config.export.clone());

    TestApp {
        router: build_app_router(state, &config),
        store,
        queue,
        worker,
        _export_dir: export_dir,
    }
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, bearer(token))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, bearer(token))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// POST with no body.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, bearer(token))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST an `application/x-www-form-urlencoded` body. Values must not need
/// escaping beyond spaces.
pub async fn post_form(app: Router, uri: &str, fields: &[(&str, &str)]) -> Response {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{k}={}", v.replace(' ', "+")))
        .collect::<Vec<_>>()
        .join("&");
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub const TEST_PASSWORD: &str = "password123";

/// Register `username` (email `{username}@example.com`) through the API.
pub async fn register(app: Router, username: &str) -> Response {
    post_json(
        app,
        "/register",
        serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": TEST_PASSWORD,
            "confirm_password": TEST_PASSWORD,
        }),
    )
    .await
}

/// Register and log in, returning the access token.
pub async fn register_and_login(test: &TestApp, username: &str) -> String {
    let response = register(test.app(), username).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        test.app(),
        "/login",
        serde_json::json!({
            "email": format!("{username}@example.com"),
            "password": TEST_PASSWORD,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["access_token"]
        .as_str()
        .expect("login should return a token")
        .to_string()
}

/// Post a question through the API and return its id.
pub async fn post_question(test: &TestApp, token: &str, title: &str) -> i64 {
    let response = post_json_auth(
        test.app(),
        "/question/new",
        serde_json::json!({ "title": title, "content": format!("details about {title}") }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_i64()
        .expect("question id should be returned")
}
