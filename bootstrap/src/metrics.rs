//! Metrics 模块
//!
//! Prometheus 记录器、HTTP 请求指标与连接池采集

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusHandle;
use shop_errors::{AppError, AppResult};
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::shutdown::ShutdownSignal;

/// Metrics 记录器
#[derive(Clone)]
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// 安装全局 Prometheus 记录器
    pub fn install() -> AppResult<Self> {
        let handle = shop_telemetry::init_metrics().map_err(|e| {
            AppError::internal(format!("Failed to install Prometheus recorder: {}", e))
        })?;
        Ok(Self { handle })
    }

    /// 获取导出句柄
    pub fn handle(&self) -> PrometheusHandle {
        self.handle.clone()
    }

    /// 获取 Prometheus 格式的 metrics
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 记录 HTTP 请求
pub fn record_http_request(method: &str, route: &str, status: u16, duration_ms: f64) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_ms", &labels).record(duration_ms);
}

/// 请求计时器
pub struct RequestTimer {
    start: Instant,
    method: String,
    route: String,
}

impl RequestTimer {
    pub fn new(method: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            method: method.into(),
            route: route.into(),
        }
    }

    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64() * 1000.0;
        record_http_request(&self.method, &self.route, status, duration);
    }
}

/// 记录 PostgreSQL 连接池指标
pub fn record_postgres_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle() as u32;
    let active = size.saturating_sub(idle);

    gauge!("postgres_pool_size").set(size as f64);
    gauge!("postgres_pool_idle").set(idle as f64);
    gauge!("postgres_pool_active").set(active as f64);

    let utilization = if size > 0 {
        (active as f64 / size as f64) * 100.0
    } else {
        0.0
    };
    gauge!("postgres_pool_utilization").set(utilization);

    debug!(size, idle, active, "Pool metrics collected");
}

/// 连接池 Metrics 采集器
///
/// 定期采集 PostgreSQL 连接池状态，直到服务关闭
pub struct PoolMetricsCollector {
    pool: PgPool,
    interval: Duration,
}

impl PoolMetricsCollector {
    pub fn new(pool: PgPool, interval: Duration) -> Self {
        Self { pool, interval }
    }

    /// 启动后台采集任务
    pub fn start(self, mut shutdown: ShutdownSignal) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => record_postgres_pool_metrics(&self.pool),
                    _ = shutdown.wait() => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_recorder_is_noop() {
        record_http_request("GET", "/health", 200, 1.5);
        RequestTimer::new("POST", "/api/analytics/events").finish(201);
    }
}
