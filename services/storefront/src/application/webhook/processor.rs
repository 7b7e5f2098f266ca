//! 支付 webhook 处理器
//!
//! 根据 `payment_intent.*` 事件驱动支付与订单状态流转，并尽力发送邮件、记录分析事件。
//! 事件 ID 在处理前原子登记，处理失败时撤销登记，以便渠道重投。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use shop_errors::{AppError, AppResult};
use tracing::{debug, info, warn};

use super::use_case::{ProcessWebhookEventRequest, WebhookOutcome, WebhookProcessingUseCase};
use crate::application::analytics::EventTracker;
use crate::domain::analytics::{Event, EventType};
use crate::domain::order::{Order, OrderId};
use crate::domain::payment::{Payment, PaymentId};
use crate::domain::repositories::{
    OrderRepository, PaymentRepository, ProcessedEventRepository, UserRepository,
};
use crate::domain::services::EmailService;
use crate::domain::webhook::ProcessedWebhookEvent;
use crate::infrastructure::metrics::record_webhook_event;

const METADATA_PAYMENT_ID: &str = "internal_payment_id";
const METADATA_ORDER_ID: &str = "order_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaymentIntentAction {
    Succeeded,
    Failed,
    RequiresAction,
    Canceled,
    Processing,
}

impl PaymentIntentAction {
    fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "payment_intent.succeeded" => Some(Self::Succeeded),
            "payment_intent.payment_failed" => Some(Self::Failed),
            "payment_intent.requires_action" => Some(Self::RequiresAction),
            "payment_intent.canceled" => Some(Self::Canceled),
            "payment_intent.processing" => Some(Self::Processing),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    object: PaymentIntentObject,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentObject {
    id: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    last_payment_error: Option<LastPaymentError>,
}

#[derive(Debug, Deserialize)]
struct LastPaymentError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl PaymentIntentObject {
    fn failure_reason(&self) -> Option<String> {
        self.last_payment_error
            .as_ref()
            .and_then(|e| e.message.clone().or_else(|| e.code.clone()))
    }

    /// 读取内部 ID，缺失时返回 `None`，非数字时返回校验错误
    fn internal_ids(&self) -> AppResult<Option<(PaymentId, OrderId)>> {
        let (Some(payment_id), Some(order_id)) = (
            self.metadata.get(METADATA_PAYMENT_ID),
            self.metadata.get(METADATA_ORDER_ID),
        ) else {
            return Ok(None);
        };

        let parse = |key: &str, raw: &str| {
            raw.trim().parse::<i64>().map_err(|_| {
                AppError::validation(format!("Metadata '{}' is not numeric: '{}'", key, raw))
            })
        };
        Ok(Some((
            parse(METADATA_PAYMENT_ID, payment_id)?,
            parse(METADATA_ORDER_ID, order_id)?,
        )))
    }
}

/// 状态流转结果：`Err` 为不可重试的非法流转
fn settle(result: AppResult<bool>) -> AppResult<Result<bool, AppError>> {
    match result {
        Ok(changed) => Ok(Ok(changed)),
        Err(e @ AppError::FailedPrecondition(_)) => Ok(Err(e)),
        Err(e) => Err(e),
    }
}

/// 支付 webhook 处理器
pub struct PaymentWebhookProcessor {
    payments: Arc<dyn PaymentRepository>,
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
    processed_events: Arc<dyn ProcessedEventRepository>,
    email_service: Arc<dyn EmailService>,
    tracker: EventTracker,
}

impl PaymentWebhookProcessor {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        orders: Arc<dyn OrderRepository>,
        users: Arc<dyn UserRepository>,
        processed_events: Arc<dyn ProcessedEventRepository>,
        email_service: Arc<dyn EmailService>,
        tracker: EventTracker,
    ) -> Self {
        Self {
            payments,
            orders,
            users,
            processed_events,
            email_service,
            tracker,
        }
    }

    async fn process(&self, request: &ProcessWebhookEventRequest) -> AppResult<WebhookOutcome> {
        let Some(action) = PaymentIntentAction::from_event_type(&request.event_type) else {
            info!(
                event_id = %request.event_id,
                event_type = %request.event_type,
                "Unhandled webhook event type, ignoring"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        let envelope: WebhookEnvelope = serde_json::from_str(&request.payload).map_err(|e| {
            AppError::validation(format!("Malformed webhook payload: {}", e))
        })?;
        let intent = envelope.data.object;

        let Some((payment_id, order_id)) = intent.internal_ids()? else {
            warn!(
                event_id = %request.event_id,
                payment_intent = %intent.id,
                "Payment intent has no internal metadata, ignoring"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        let Some(mut payment) = self.payments.find_by_id(payment_id).await? else {
            warn!(event_id = %request.event_id, payment_id, "Payment not found, ignoring");
            return Ok(WebhookOutcome::Ignored);
        };
        if payment.order_id != order_id {
            warn!(
                event_id = %request.event_id,
                payment_id,
                order_id,
                payment_order_id = payment.order_id,
                "Payment belongs to another order, ignoring"
            );
            return Ok(WebhookOutcome::Ignored);
        }
        let Some(mut order) = self.orders.find_by_id(order_id).await? else {
            warn!(event_id = %request.event_id, order_id, "Order not found, ignoring");
            return Ok(WebhookOutcome::Ignored);
        };

        let processed_at = DateTime::from_timestamp(request.created, 0).unwrap_or_else(Utc::now);
        let (payment_change, order_change) = match action {
            PaymentIntentAction::Succeeded => (
                settle(payment.complete(intent.id.clone(), processed_at))?,
                settle(order.confirm())?,
            ),
            PaymentIntentAction::Failed => (
                settle(payment.fail(intent.failure_reason()))?,
                settle(order.mark_payment_failed())?,
            ),
            PaymentIntentAction::Canceled => (settle(payment.cancel())?, settle(order.cancel())?),
            PaymentIntentAction::RequiresAction => (settle(payment.require_action())?, Ok(false)),
            PaymentIntentAction::Processing => (settle(payment.mark_processing())?, Ok(false)),
        };

        let (payment_changed, order_changed) = match (payment_change, order_change) {
            (Ok(p), Ok(o)) => (p, o),
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    event_id = %request.event_id,
                    payment_id,
                    order_id,
                    error = %e,
                    "Invalid state transition, ignoring"
                );
                return Ok(WebhookOutcome::Ignored);
            }
        };

        match (payment_changed, order_changed) {
            (true, true) => self.payments.save_with_order(&payment, &order).await?,
            (true, false) => self.payments.save(&payment).await?,
            (false, true) => self.orders.save(&order).await?,
            (false, false) => {}
        }

        info!(
            event_id = %request.event_id,
            payment_id,
            order_id,
            payment_status = %payment.status,
            order_status = %order.status,
            payment_changed,
            order_changed,
            "Payment webhook applied"
        );

        // 订单仍未流转说明之前的投递未完成，副作用需要补发
        if payment_changed || order_changed {
            self.after_transition(action, &payment, &order).await;
        } else {
            debug!(
                event_id = %request.event_id,
                "Payment and order already in target state, side effects skipped"
            );
        }

        Ok(WebhookOutcome::Processed)
    }

    /// 邮件与分析事件，失败只记录告警
    async fn after_transition(
        &self,
        action: PaymentIntentAction,
        payment: &Payment,
        order: &Order,
    ) {
        let payload = json!({
            "payment_id": payment.id,
            "order_id": order.id,
            "amount": payment.amount.amount,
            "currency": payment.amount.currency.code(),
        });

        match action {
            PaymentIntentAction::Succeeded => {
                self.notify(order, EmailKind::OrderConfirmation).await;
                self.track(EventType::PaymentSucceeded, order, payload.clone()).await;
                self.track(EventType::OrderCompleted, order, payload).await;
            }
            PaymentIntentAction::Failed => {
                self.notify(order, EmailKind::PaymentFailed).await;
                self.track(EventType::PaymentFailed, order, payload).await;
            }
            PaymentIntentAction::Canceled => {
                self.track(EventType::OrderCancelled, order, payload).await;
            }
            PaymentIntentAction::RequiresAction | PaymentIntentAction::Processing => {}
        }
    }

    async fn notify(&self, order: &Order, kind: EmailKind) {
        let user = match self.users.find_by_id(order.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(
                    order_id = order.id,
                    user_id = %order.user_id,
                    "Order owner not found, email skipped"
                );
                return;
            }
            Err(e) => {
                warn!(order_id = order.id, error = %e, "Failed to load order owner, email skipped");
                return;
            }
        };

        let result = match kind {
            EmailKind::OrderConfirmation => {
                self.email_service.send_order_confirmation(&user, order).await
            }
            EmailKind::PaymentFailed => self.email_service.send_payment_failed(&user, order).await,
        };
        if let Err(e) = result {
            warn!(
                order_id = order.id,
                user_id = %user.id,
                error = %e,
                "Failed to send payment email"
            );
        }
    }

    async fn track(&self, event_type: EventType, order: &Order, payload: serde_json::Value) {
        let event = Event::for_user(event_type, order.user_id.to_string())
            .and_then(|event| event.with_payload(payload));
        self.tracker.track_best_effort(event).await;
    }
}

#[derive(Debug, Clone, Copy)]
enum EmailKind {
    OrderConfirmation,
    PaymentFailed,
}

#[async_trait]
impl WebhookProcessingUseCase for PaymentWebhookProcessor {
    async fn execute(&self, request: ProcessWebhookEventRequest) -> AppResult<WebhookOutcome> {
        if request.event_id.trim().is_empty() {
            return Err(AppError::validation("Webhook event id must not be empty"));
        }

        info!(
            event_id = %request.event_id,
            event_type = %request.event_type,
            "Processing webhook event"
        );

        let claim = ProcessedWebhookEvent::new(request.event_id.clone());
        if !self.processed_events.try_claim(&claim).await? {
            info!(event_id = %request.event_id, "Duplicate webhook event, skipping");
            record_webhook_event(&request.event_type, WebhookOutcome::Duplicate.as_str());
            return Ok(WebhookOutcome::Duplicate);
        }

        match self.process(&request).await {
            Ok(outcome) => {
                record_webhook_event(&request.event_type, outcome.as_str());
                Ok(outcome)
            }
            Err(e) => {
                warn!(
                    event_id = %request.event_id,
                    event_type = %request.event_type,
                    error = %e,
                    "Webhook processing failed"
                );
                if let Err(release_err) = self.processed_events.release(&request.event_id).await {
                    warn!(
                        event_id = %request.event_id,
                        error = %release_err,
                        "Failed to release webhook event claim"
                    );
                }
                record_webhook_event(&request.event_type, "failed");
                Err(e)
            }
        }
    }
}
