#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use once_cell::sync::Lazy;
use serde_json::Value;
use tower::ServiceExt;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use intel_core::{BattleService, ChatBackend, CompletionRequest, UpstreamError};
use intel_web::{build_router, AppState};

static START: Once = Once::new();
static _GUARD: Lazy<Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> =
    Lazy::new(|| Mutex::new(None));

pub const TEST_ORIGIN: &str = "http://localhost:5173";

/// Initialize test tracing (stderr + rotating file). Idempotent.
pub fn init() {
    START.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .expect("env filter");

        let file_appender = rolling::daily("logs", "tests.log");
        let (file_nb, guard) = tracing_appender::non_blocking(file_appender);
        *_GUARD.lock().unwrap() = Some(guard);

        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_test_writer();

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(file_nb);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init();

        tracing::info!(target: "test_init", "Test tracing initialized (stderr + rotating file)");
    });
}

/// Backend that returns a canned reply and records every request it receives.
pub struct FakeBackend {
    reply: Result<String, UpstreamError>,
    pub calls: Mutex<Vec<CompletionRequest>>,
}

impl FakeBackend {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(UpstreamError::from_message(message)),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        self.calls.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}

pub fn app_with(backend: Arc<FakeBackend>) -> Router {
    let state = AppState::new(BattleService::new(backend));
    build_router(state, &[TEST_ORIGIN.to_string()]).expect("router")
}

/// Send one request and decode the JSON body (Null when the body is empty or not JSON).
pub async fn send(app: Router, request: Request<Body>) -> (axum::http::StatusCode, Value) {
    let resp = app.oneshot(request).await.expect("infallible");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
