//! 基础设施资源管理
//!
//! 统一创建服务共享的基础设施资源

use std::sync::Arc;

use secrecy::ExposeSecret;
use shop_adapter_email::{EmailClient, EmailSender};
use shop_adapter_postgres::{PostgresConfig, check_connection, create_pool};
use shop_config::{AppConfig, StorageBackend};
use shop_errors::{AppError, AppResult};
use sqlx::PgPool;
use tracing::info;

use crate::metrics::MetricsRecorder;
use crate::retry::{RetryConfig, with_retry};
use crate::shutdown::{ShutdownController, ShutdownSignal};

/// 基础设施资源容器
pub struct Infrastructure {
    /// 应用配置
    config: AppConfig,
    /// PostgreSQL 连接池（内存存储时为空）
    postgres_pool: Option<PgPool>,
    /// SMTP 邮件客户端
    email_sender: Arc<dyn EmailSender>,
    /// Prometheus 记录器
    metrics: Option<MetricsRecorder>,
    /// 关闭控制器
    shutdown: ShutdownController,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（数据库连接带重试）
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let postgres_pool = match config.storage.backend {
            StorageBackend::Postgres => {
                let database = config.database.as_ref().ok_or_else(|| {
                    AppError::internal("storage.backend = postgres but [database] is missing")
                })?;

                let pg_config = PostgresConfig::new(database.url.expose_secret())
                    .with_max_connections(database.max_connections);
                let pool = with_retry(&RetryConfig::default(), "PostgreSQL connection", || {
                    let cfg = pg_config.clone();
                    async move { create_pool(&cfg).await }
                })
                .await?;
                info!(
                    "PostgreSQL connection pool created (max_connections: {})",
                    database.max_connections
                );
                Some(pool)
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage, PostgreSQL skipped");
                None
            }
        };

        let email_sender: Arc<dyn EmailSender> = Arc::new(EmailClient::new(&config.email)?);
        info!(
            smtp_host = %config.email.smtp_host,
            smtp_port = config.email.smtp_port,
            "SMTP email client created"
        );

        Ok(Self {
            config,
            postgres_pool,
            email_sender,
            metrics: None,
            shutdown: ShutdownController::new(),
        })
    }

    /// 附加 Prometheus 记录器
    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// 获取应用配置
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 获取 PostgreSQL 连接池（如果使用 PostgreSQL 存储）
    pub fn postgres_pool(&self) -> Option<PgPool> {
        self.postgres_pool.clone()
    }

    /// 获取邮件发送器
    pub fn email_sender(&self) -> Arc<dyn EmailSender> {
        self.email_sender.clone()
    }

    /// 获取 Prometheus 记录器
    pub fn metrics(&self) -> Option<MetricsRecorder> {
        self.metrics.clone()
    }

    /// 订阅关闭信号（用于后台任务）
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.subscribe()
    }

    pub(crate) fn shutdown_controller(&self) -> ShutdownController {
        self.shutdown.clone()
    }

    /// 检查 PostgreSQL 连接状态，内存存储时总是可用
    pub async fn check_database(&self) -> AppResult<()> {
        match &self.postgres_pool {
            Some(pool) => check_connection(pool).await,
            None => Ok(()),
        }
    }
}
