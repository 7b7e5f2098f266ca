//! 依赖组装
//!
//! 所有协作者以 `Arc<dyn Trait>` 显式注入，存储后端在这里二选一。

use std::sync::Arc;

use shop_adapter_email::EmailSender;
use shop_bootstrap::MetricsRecorder;
use shop_config::AppConfig;
use shop_errors::AppResult;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::application::analytics::{AnalyticsQueryHandler, EventTracker, TrackEventHandler};
use crate::application::cart::{CartCommandHandler, CartQueryHandler};
use crate::application::webhook::{PaymentWebhookProcessor, WebhookProcessingUseCase};
use crate::domain::repositories::{
    AnalyticsRepository, CartRepository, OrderRepository, PaymentRepository,
    ProcessedEventRepository, UserRepository,
};
use crate::domain::services::EmailService;
use crate::infrastructure::notification::SmtpEmailService;
use crate::infrastructure::persistence::memory::{
    InMemoryAnalyticsRepository, InMemoryCartRepository, InMemoryOrderRepository,
    InMemoryPaymentRepository, InMemoryProcessedEventRepository, InMemoryUserRepository,
};
use crate::infrastructure::persistence::postgres::{
    PostgresAnalyticsRepository, PostgresCartRepository, PostgresOrderRepository,
    PostgresPaymentRepository, PostgresProcessedEventRepository, PostgresUserRepository,
};
use crate::infrastructure::webhook::StripeSignatureVerifier;

/// 仓储集合
#[derive(Clone)]
pub struct Repositories {
    pub analytics: Arc<dyn AnalyticsRepository>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub users: Arc<dyn UserRepository>,
    pub processed_events: Arc<dyn ProcessedEventRepository>,
}

impl Repositories {
    /// PostgreSQL 后端
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            analytics: Arc::new(PostgresAnalyticsRepository::new(pool.clone())),
            carts: Arc::new(PostgresCartRepository::new(pool.clone())),
            orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
            payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            processed_events: Arc::new(PostgresProcessedEventRepository::new(pool)),
        }
    }

    /// 内存后端（开发、测试）
    pub fn in_memory() -> Self {
        let orders = Arc::new(InMemoryOrderRepository::new());
        Self {
            analytics: Arc::new(InMemoryAnalyticsRepository::new()),
            carts: Arc::new(InMemoryCartRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new(orders.clone())),
            orders,
            users: Arc::new(InMemoryUserRepository::new()),
            processed_events: Arc::new(InMemoryProcessedEventRepository::new()),
        }
    }
}

/// HTTP 层共享状态
#[derive(Clone)]
pub struct AppState {
    pub track_event: Arc<TrackEventHandler>,
    pub analytics_queries: Arc<AnalyticsQueryHandler>,
    pub cart_commands: Arc<CartCommandHandler>,
    pub cart_queries: Arc<CartQueryHandler>,
    pub webhook: Arc<dyn WebhookProcessingUseCase>,
    /// 未配置密钥时为空，webhook 请求一律拒绝
    pub signature_verifier: Option<Arc<StripeSignatureVerifier>>,
    pub database: Option<PgPool>,
    pub metrics: Option<MetricsRecorder>,
}

impl AppState {
    pub fn new(
        repositories: &Repositories,
        email_sender: Arc<dyn EmailSender>,
        config: &AppConfig,
    ) -> AppResult<Self> {
        // 组装邮件服务
        let email_service: Arc<dyn EmailService> =
            Arc::new(SmtpEmailService::from_config(email_sender, config)?);

        // 组装用例
        let tracker = EventTracker::new(repositories.analytics.clone());
        let webhook: Arc<dyn WebhookProcessingUseCase> = Arc::new(PaymentWebhookProcessor::new(
            repositories.payments.clone(),
            repositories.orders.clone(),
            repositories.users.clone(),
            repositories.processed_events.clone(),
            email_service,
            tracker.clone(),
        ));

        // 组装签名校验器
        let signature_verifier = if config.webhook.is_configured() {
            Some(Arc::new(StripeSignatureVerifier::new(
                config.webhook.stripe_secret.clone(),
                config.webhook.tolerance_secs,
            )))
        } else {
            warn!("Webhook secret is not configured, payment webhooks will be rejected");
            None
        };

        info!("Application state assembled");

        Ok(Self {
            track_event: Arc::new(TrackEventHandler::new(tracker.clone())),
            analytics_queries: Arc::new(AnalyticsQueryHandler::new(
                repositories.analytics.clone(),
            )),
            cart_commands: Arc::new(CartCommandHandler::new(
                repositories.carts.clone(),
                tracker,
            )),
            cart_queries: Arc::new(CartQueryHandler::new(repositories.carts.clone())),
            webhook,
            signature_verifier,
            database: None,
            metrics: None,
        })
    }

    /// 健康检查使用的数据库连接池
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }

    /// `/metrics` 使用的 Prometheus 记录器
    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
