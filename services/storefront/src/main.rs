//! Storefront 服务入口
//!
//! 使用 shop-bootstrap 统一启动模式

use shop_bootstrap::run_http;
use storefront::api::http::build_router;
use storefront::application::webhook::ProcessedEventCleanupTask;
use storefront::container::{AppState, Repositories};
use storefront::infrastructure::persistence::migrations::run_migrations;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_http("config", |infra| async move {
        let config = infra.config();

        // 组装仓储（PostgreSQL 或内存）
        let repositories = match infra.postgres_pool() {
            Some(pool) => {
                run_migrations(&pool).await?;
                Repositories::postgres(pool)
            }
            None => {
                info!("No database configured, using in-memory storage");
                Repositories::in_memory()
            }
        };

        // 组装应用状态
        let mut state = AppState::new(&repositories, infra.email_sender(), config)?;
        if let Some(pool) = infra.postgres_pool() {
            state = state.with_database(pool);
        }
        if let Some(metrics) = infra.metrics() {
            state = state.with_metrics(metrics);
        }

        // 启动幂等记录清理任务
        let _cleanup = ProcessedEventCleanupTask::new(
            repositories.processed_events.clone(),
            config.webhook.processed_event_ttl_hours,
        )
        .start(infra.shutdown_signal());

        Ok(build_router(state))
    })
    .await
}
