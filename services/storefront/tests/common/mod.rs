//! 集成测试公共设施

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use shop_adapter_email::{EmailMessage, EmailSender};
use shop_config::AppConfig;
use shop_errors::AppResult;
use storefront::api::http::build_router;
use storefront::container::{AppState, Repositories};
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_integration_test";

/// 记录所有发出的邮件
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        self.sent.lock().await.push(message);
        Ok(())
    }
}

pub fn test_config(stripe_secret: &str) -> AppConfig {
    serde_json::from_value(json!({
        "app_name": "storefront",
        "storage": { "backend": "memory" },
        "email": {
            "smtp_host": "localhost",
            "smtp_port": 1025,
            "from_email": "noreply@example.com",
            "from_name": "Storefront"
        },
        "links": { "app_base_url": "https://shop.example.com/" },
        "webhook": { "stripe_secret": stripe_secret }
    }))
    .unwrap()
}

pub struct TestApp {
    pub router: Router,
    pub repositories: Repositories,
    pub sender: Arc<RecordingSender>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_secret(WEBHOOK_SECRET)
    }

    pub fn with_secret(stripe_secret: &str) -> Self {
        let repositories = Repositories::in_memory();
        let sender = Arc::new(RecordingSender::default());
        let state = AppState::new(&repositories, sender.clone(), &test_config(stripe_secret))
            .unwrap();
        Self {
            router: build_router(state),
            repositories,
            sender,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("PUT", uri, body)).await
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
