//! 支付渠道 webhook 接口

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use shop_errors::AppError;
use tracing::{info, warn};

use crate::application::webhook::ProcessWebhookEventRequest;
use crate::container::AppState;
use crate::infrastructure::webhook::SIGNATURE_HEADER;

/// 接收的事件类型，其余类型直接确认
const SUPPORTED_EVENT_TYPES: [&str; 6] = [
    "payment_intent.succeeded",
    "payment_intent.payment_failed",
    "payment_intent.requires_action",
    "payment_intent.canceled",
    "payment_intent.processing",
    "payment_intent.amount_capturable_updated",
];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/webhooks/stripe", post(receive_stripe_event))
        .route("/api/webhooks/stripe/health", get(webhook_health))
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
}

fn is_supported(event_type: &str) -> bool {
    SUPPORTED_EVENT_TYPES.contains(&event_type)
}

fn received(extra: serde_json::Value) -> Response {
    let mut body = json!({ "received": true });
    if let (Some(body), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        body.extend(extra.clone());
    }
    (StatusCode::OK, Json(body)).into_response()
}

async fn receive_stripe_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: String,
) -> Response {
    let Some(verifier) = state.signature_verifier.as_ref() else {
        warn!("Webhook received but no signing secret is configured");
        return AppError::internal("Webhook signing secret is not configured").into_response();
    };

    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!("Webhook request without signature header");
        return AppError::validation("Missing Stripe-Signature header").into_response();
    };

    if let Err(e) = verifier.verify_now(&payload, signature) {
        warn!(error = %e, "Webhook signature verification failed");
        return AppError::validation(format!("Invalid webhook signature: {}", e)).into_response();
    }

    let envelope: EventEnvelope = match serde_json::from_str(&payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Malformed webhook payload");
            return AppError::validation(format!("Malformed webhook payload: {}", e))
                .into_response();
        }
    };

    if !is_supported(&envelope.event_type) {
        info!(
            event_id = %envelope.id,
            event_type = %envelope.event_type,
            "Unsupported webhook event type, acknowledged"
        );
        return received(json!({ "outcome": "unsupported" }));
    }

    let event_id = envelope.id.clone();
    let event_type = envelope.event_type.clone();
    match state
        .webhook
        .execute(ProcessWebhookEventRequest {
            event_id: envelope.id,
            event_type: envelope.event_type,
            payload,
            created: envelope.created,
        })
        .await
    {
        Ok(outcome) => {
            info!(
                event_id = %event_id,
                event_type = %event_type,
                outcome = %outcome,
                "Webhook handled"
            );
            received(json!({ "outcome": outcome.as_str() }))
        }
        Err(e) => {
            warn!(
                event_id = %event_id,
                event_type = %event_type,
                error = %e,
                retryable = e.is_retryable(),
                "Webhook processing failed"
            );
            e.into_response()
        }
    }
}

async fn webhook_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "signature_verification": state.signature_verifier.is_some(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_types() {
        assert!(is_supported("payment_intent.succeeded"));
        assert!(is_supported("payment_intent.amount_capturable_updated"));
        assert!(!is_supported("customer.created"));
    }

    #[test]
    fn test_envelope_defaults_created() {
        let envelope: EventEnvelope =
            serde_json::from_str(r#"{"id":"evt_1","type":"payment_intent.succeeded"}"#).unwrap();
        assert_eq!(envelope.id, "evt_1");
        assert_eq!(envelope.created, 0);
    }
}
