//! 已处理事件清理任务

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shop_bootstrap::ShutdownSignal;
use shop_errors::AppResult;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::repositories::ProcessedEventRepository;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// 定期删除超过保留期的幂等记录
pub struct ProcessedEventCleanupTask {
    repository: Arc<dyn ProcessedEventRepository>,
    ttl: chrono::Duration,
    interval: Duration,
}

impl ProcessedEventCleanupTask {
    pub fn new(repository: Arc<dyn ProcessedEventRepository>, ttl_hours: i64) -> Self {
        Self {
            repository,
            ttl: chrono::Duration::hours(ttl_hours),
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 执行一次清理，返回删除数量
    pub async fn run_once(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - self.ttl;
        let removed = self.repository.cleanup_before(cutoff).await?;
        info!(removed, %cutoff, "Processed webhook events cleaned up");
        Ok(removed)
    }

    /// 启动后台任务，直到服务关闭
    pub fn start(self, mut shutdown: ShutdownSignal) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.run_once().await {
                            warn!(error = %e, "Processed webhook event cleanup failed");
                        }
                    }
                    _ = shutdown.wait() => break,
                }
            }
            info!("Processed webhook event cleanup stopped");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook::ProcessedWebhookEvent;
    use crate::infrastructure::persistence::memory::InMemoryProcessedEventRepository;
    use shop_bootstrap::ShutdownController;

    #[tokio::test]
    async fn test_run_once_removes_expired_records() {
        let repo = Arc::new(InMemoryProcessedEventRepository::new());
        let old = ProcessedWebhookEvent {
            event_id: "evt_old".into(),
            processed_at: Utc::now() - chrono::Duration::hours(48),
        };
        repo.try_claim(&old).await.unwrap();
        repo.try_claim(&ProcessedWebhookEvent::new("evt_new")).await.unwrap();

        let task = ProcessedEventCleanupTask::new(repo.clone(), 24);
        assert_eq!(task.run_once().await.unwrap(), 1);
        assert!(!repo.exists("evt_old").await.unwrap());
        assert!(repo.exists("evt_new").await.unwrap());
    }

    #[tokio::test]
    async fn test_task_stops_on_shutdown() {
        let repo = Arc::new(InMemoryProcessedEventRepository::new());
        let controller = ShutdownController::new();
        let handle = ProcessedEventCleanupTask::new(repo, 24)
            .with_interval(Duration::from_millis(10))
            .start(controller.subscribe());

        controller.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
