//! 分析用例处理器

use std::sync::Arc;

use async_trait::async_trait;
use shop_cqrs_core::{CommandHandler, QueryHandler};
use shop_errors::{AppError, AppResult};
use tracing::info;
use uuid::Uuid;

use super::commands::TrackEventCommand;
use super::queries::{GenerateReportQuery, GetUserActivityQuery, ListEventsQuery};
use super::tracker::EventTracker;
use crate::domain::analytics::{Event, EventType, Report, UserActivity};
use crate::domain::repositories::AnalyticsRepository;

/// 记录事件处理器
pub struct TrackEventHandler {
    tracker: EventTracker,
}

impl TrackEventHandler {
    pub fn new(tracker: EventTracker) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl CommandHandler<TrackEventCommand> for TrackEventHandler {
    async fn handle(&self, command: TrackEventCommand) -> AppResult<Uuid> {
        let event_type: EventType = command.event_type.trim().parse()?;

        let mut event = Event::new(event_type, command.user_id, command.session_id)?
            .with_context(command.context);
        if let Some(payload) = command.payload {
            event = event.with_payload(payload)?;
        }
        if let Some(occurred_at) = command.occurred_at {
            event = event.with_occurred_at(occurred_at);
        }

        info!(
            event_id = %event.id(),
            event_type = %event_type,
            user_id = ?event.user_id(),
            "Handling TrackEventCommand"
        );

        self.tracker.track(&event).await?;
        Ok(event.id())
    }
}

/// 分析查询处理器
pub struct AnalyticsQueryHandler {
    repository: Arc<dyn AnalyticsRepository>,
}

impl AnalyticsQueryHandler {
    pub fn new(repository: Arc<dyn AnalyticsRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl QueryHandler<GetUserActivityQuery> for AnalyticsQueryHandler {
    async fn handle(&self, query: GetUserActivityQuery) -> AppResult<Option<UserActivity>> {
        let user_id = query.user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::validation("user_id must not be empty"));
        }

        info!(user_id = %user_id, "Handling GetUserActivityQuery");
        self.repository.find_user_activity_by_user_id(user_id).await
    }
}

#[async_trait]
impl QueryHandler<GenerateReportQuery> for AnalyticsQueryHandler {
    async fn handle(&self, query: GenerateReportQuery) -> AppResult<Report> {
        info!(
            report_type = %query.report_type,
            params = ?query.params,
            "Handling GenerateReportQuery"
        );
        self.repository
            .generate_report(&query.report_type, &query.params)
            .await
    }
}

#[async_trait]
impl QueryHandler<ListEventsQuery> for AnalyticsQueryHandler {
    async fn handle(&self, query: ListEventsQuery) -> AppResult<Vec<Event>> {
        query.filter.validate()?;
        self.repository.find_events(&query.filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::RequestContext;
    use crate::domain::repositories::MockAnalyticsRepository;
    use serde_json::json;

    fn command(event_type: &str) -> TrackEventCommand {
        TrackEventCommand {
            event_type: event_type.to_string(),
            user_id: Some("u1".to_string()),
            session_id: None,
            payload: Some(json!({"product_id": 7})),
            occurred_at: None,
            context: RequestContext::default(),
        }
    }

    #[tokio::test]
    async fn test_track_event_saves_and_returns_id() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_save_event()
            .withf(|e| e.event_type() == EventType::ProductView && e.payload()["product_id"] == 7)
            .times(1)
            .returning(|_| Ok(()));
        let handler = TrackEventHandler::new(EventTracker::new(Arc::new(repo)));

        let id = handler.handle(command("PRODUCT_VIEW")).await.unwrap();
        assert!(!id.is_nil());
    }

    #[tokio::test]
    async fn test_track_event_rejects_unknown_type() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_save_event().never();
        let handler = TrackEventHandler::new(EventTracker::new(Arc::new(repo)));

        let err = handler.handle(command("CHECKOUT")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_track_event_surfaces_storage_failure() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_save_event()
            .returning(|_| Err(AppError::database("disk full")));
        let handler = TrackEventHandler::new(EventTracker::new(Arc::new(repo)));

        let err = handler.handle(command("PAGE_VIEW")).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_blank_user_id_rejected() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_find_user_activity_by_user_id().never();
        let handler = AnalyticsQueryHandler::new(Arc::new(repo));

        let err = handler
            .handle(GetUserActivityQuery { user_id: "  ".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_activity_absent() {
        let mut repo = MockAnalyticsRepository::new();
        repo.expect_find_user_activity_by_user_id()
            .returning(|_| Ok(None));
        let handler = AnalyticsQueryHandler::new(Arc::new(repo));

        let activity = handler
            .handle(GetUserActivityQuery { user_id: "ghost".into() })
            .await
            .unwrap();
        assert!(activity.is_none());
    }
}
