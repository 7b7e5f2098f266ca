//! 事件记录器
//!
//! 所有写入分析事件的用例都经由这里，统一打点与日志。

use std::sync::Arc;

use shop_errors::AppResult;
use tracing::{debug, warn};

use crate::domain::analytics::Event;
use crate::domain::repositories::AnalyticsRepository;
use crate::infrastructure::metrics::record_analytics_event_tracked;

#[derive(Clone)]
pub struct EventTracker {
    repository: Arc<dyn AnalyticsRepository>,
}

impl EventTracker {
    pub fn new(repository: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repository }
    }

    /// 保存事件，失败时返回错误
    pub async fn track(&self, event: &Event) -> AppResult<()> {
        self.repository.save_event(event).await?;
        record_analytics_event_tracked(event.event_type().as_str());
        debug!(
            event_id = %event.id(),
            event_type = %event.event_type(),
            "Analytics event tracked"
        );
        Ok(())
    }

    /// 尽力保存事件，失败只记录告警
    pub async fn track_best_effort(&self, event: AppResult<Event>) {
        let result = match event {
            Ok(event) => self.track(&event).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to track analytics event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::EventType;
    use crate::domain::repositories::MockAnalyticsRepository;
    use shop_errors::AppError;

    #[tokio::test]
    async fn test_track_propagates_failure() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_save_event()
            .returning(|_| Err(AppError::database("connection refused")));
        let tracker = EventTracker::new(Arc::new(repo));

        let event = Event::for_user(EventType::PageView, "u1").unwrap();
        let err = tracker.track(&event).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failure() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_save_event()
            .times(1)
            .returning(|_| Err(AppError::database("connection refused")));
        let tracker = EventTracker::new(Arc::new(repo));

        tracker
            .track_best_effort(Event::for_user(EventType::AddToCart, "u1"))
            .await;
    }

    #[tokio::test]
    async fn test_best_effort_skips_invalid_event() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_save_event().never();
        let tracker = EventTracker::new(Arc::new(repo));

        tracker
            .track_best_effort(Event::new(EventType::AddToCart, None, None))
            .await;
    }
}
