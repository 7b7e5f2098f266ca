//! 内存分析事件仓储

use async_trait::async_trait;
use shop_errors::{AppError, AppResult};
use tokio::sync::RwLock;

use crate::domain::analytics::{Event, EventFilter, Report, ReportParams, ReportQuery, UserActivity};
use crate::domain::repositories::AnalyticsRepository;

#[derive(Default)]
pub struct InMemoryAnalyticsRepository {
    events: RwLock<Vec<Event>>,
}

impl InMemoryAnalyticsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalyticsRepository for InMemoryAnalyticsRepository {
    async fn save_event(&self, event: &Event) -> AppResult<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn find_user_activity_by_user_id(
        &self,
        user_id: &str,
    ) -> AppResult<Option<UserActivity>> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::validation("user_id must not be empty"));
        }

        let events = self.events.read().await;
        let owned: Vec<Event> = events
            .iter()
            .filter(|e| e.user_id() == Some(user_id))
            .cloned()
            .collect();
        Ok(UserActivity::from_events(user_id, owned))
    }

    async fn generate_report(
        &self,
        report_type: &str,
        params: &ReportParams,
    ) -> AppResult<Report> {
        let query = ReportQuery::parse(report_type, params)?;
        let events = self.events.read().await;
        Ok(query.evaluate(events.iter()))
    }

    async fn find_events(&self, filter: &EventFilter) -> AppResult<Vec<Event>> {
        filter.validate()?;

        let events = self.events.read().await;
        let mut matched: Vec<Event> =
            events.iter().filter(|e| filter.matches(e)).cloned().collect();
        matched.sort_by(|a, b| b.occurred_at().cmp(&a.occurred_at()));
        matched.truncate(filter.limit);
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analytics::{EventType, ReportData};
    use chrono::{TimeZone, Utc};

    fn event(event_type: EventType, user: &str) -> Event {
        Event::for_user(event_type, user)
            .unwrap()
            .with_occurred_at(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_saved_event_is_discoverable() {
        let repo = InMemoryAnalyticsRepository::new();
        let saved = event(EventType::PageView, "u1");
        repo.save_event(&saved).await.unwrap();

        let activity = repo.find_user_activity_by_user_id("u1").await.unwrap().unwrap();
        assert_eq!(activity.total_events, 1);
        assert_eq!(activity.recent_events[0].id(), saved.id());

        let listed = repo.find_events(&EventFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_activity() {
        let repo = InMemoryAnalyticsRepository::new();
        repo.save_event(&event(EventType::PageView, "u1")).await.unwrap();
        assert!(repo.find_user_activity_by_user_id("u2").await.unwrap().is_none());
        assert!(repo.find_user_activity_by_user_id("").await.is_err());
    }

    #[tokio::test]
    async fn test_report() {
        let repo = InMemoryAnalyticsRepository::new();
        repo.save_event(&event(EventType::PageView, "u1")).await.unwrap();
        repo.save_event(&event(EventType::Search, "u1")).await.unwrap();

        let params: ReportParams = [("from", "2026-03-01"), ("to", "2026-03-01")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let report = repo.generate_report("event_summary", &params).await.unwrap();
        let ReportData::EventSummary(summary) = report.data else {
            panic!("expected event summary");
        };
        assert_eq!(summary.total_events, 2);

        let err = repo.generate_report("revenue", &params).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_find_events_newest_first_with_limit() {
        let repo = InMemoryAnalyticsRepository::new();
        for day in 1..=3 {
            let e = Event::for_user(EventType::PageView, "u1")
                .unwrap()
                .with_occurred_at(Utc.with_ymd_and_hms(2026, 3, day, 0, 0, 0).unwrap());
            repo.save_event(&e).await.unwrap();
        }

        let filter = EventFilter {
            limit: 2,
            ..Default::default()
        };
        let events = repo.find_events(&filter).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].occurred_at() > events[1].occurred_at());
    }
}
