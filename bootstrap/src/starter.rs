//! 服务启动器
//!
//! 提供统一的 HTTP 服务启动模式

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use shop_config::AppConfig;
use shop_errors::AppResult;
use tracing::{info, warn};

use crate::infrastructure::Infrastructure;
use crate::metrics::{MetricsRecorder, PoolMetricsCollector};
use crate::runtime::{init_runtime, shutdown_signal};

/// 运行 HTTP 服务
///
/// 服务的统一入口点。它负责：
/// 1. 加载 `.env` 与配置
/// 2. 初始化运行时（日志）
/// 3. 安装 Prometheus 记录器
/// 4. 创建基础设施资源（数据库、邮件）
/// 5. 调用闭包构建 axum 路由
/// 6. 启动服务器并处理 graceful shutdown
///
/// # 示例
///
/// ```ignore
/// use shop_bootstrap::run_http;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     run_http("config", |infra| async move { build_router(infra).await }).await
/// }
/// ```
pub async fn run_http<F, Fut>(
    config_dir: &str,
    app_builder: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Arc<Infrastructure>) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    // 1. 加载配置
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    let config = AppConfig::load(config_dir)?;

    // 2. 初始化运行时
    init_runtime(&config);

    info!("Starting {} service", config.app_name);

    // 3. 初始化 Metrics 记录器
    let metrics = match MetricsRecorder::install() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!(error = %e, "Prometheus recorder unavailable, metrics disabled");
            None
        }
    };

    // 4. 创建基础设施
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let mut infra = Infrastructure::from_config(config).await?;
    if let Some(metrics) = metrics {
        infra = infra.with_metrics(metrics);
    }
    let infra = Arc::new(infra);
    let shutdown = infra.shutdown_controller();

    // 5. 启动连接池 metrics 采集器
    let pool_metrics = infra.postgres_pool().map(|pool| {
        PoolMetricsCollector::new(pool, Duration::from_secs(15)).start(infra.shutdown_signal())
    });

    // 6. 构建路由
    let app = app_builder(infra.clone()).await?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server starting");

    // 7. 启动服务器
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 8. 通知后台任务退出
    shutdown.shutdown();
    if let Some(handle) = pool_metrics {
        let _ = handle.await;
    }

    info!("Service stopped");

    Ok(())
}
