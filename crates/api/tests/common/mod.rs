#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use seekreap_api::config::ServerConfig;
use seekreap_api::engine::forwarder::{ForwardRequest, ProcessingTier};
use seekreap_api::router::build_app_router;
use seekreap_api::state::AppState;
use seekreap_api::storage::UploadStore;
use seekreap_core::forwarding::ForwardOutcome;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(upload_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        upload_dir: upload_dir.to_path_buf(),
        max_upload_bytes: 100 * 1024 * 1024,
        processing_tier_url: None,
        processing_tier_timeout_secs: 1,
        default_creator_id: "1".to_string(),
    }
}

/// Processing tier stand-in that answers with a fixed outcome and records
/// every request it receives.
pub struct RecordingTier {
    outcome: ForwardOutcome,
    pub requests: Mutex<Vec<ForwardRequest>>,
}

impl RecordingTier {
    pub fn new(outcome: ForwardOutcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn received(&self) -> Vec<ForwardRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessingTier for RecordingTier {
    async fn forward(&self, request: &ForwardRequest) -> ForwardOutcome {
        self.requests.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

/// A router plus the handles tests inspect. The upload directory lives as
/// long as this value.
pub struct TestApp {
    router: Router,
    pub tier: Arc<RecordingTier>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router with a tier that accepts every job.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with_outcome(
        pool,
        ForwardOutcome::Forwarded {
            correlation_id: Some("tier-abc".to_string()),
        },
    )
}

/// Build the full application router with a tier that answers `outcome`.
///
/// Uses [`build_app_router`] so tests exercise the same middleware stack
/// production uses.
pub fn build_test_app_with_outcome(pool: PgPool, outcome: ForwardOutcome) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = test_config(upload_dir.path());
    let tier = Arc::new(RecordingTier::new(outcome));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        processing_tier: tier.clone(),
        uploads: Arc::new(UploadStore::new(upload_dir.path())),
    };

    TestApp {
        router: build_app_router(state, &config),
        tier,
        upload_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PATCH, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

/// One part of a multipart form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

const BOUNDARY: &str = "seekreap-test-boundary";

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
