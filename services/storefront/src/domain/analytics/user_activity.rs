//! 用户活动汇总（读取时计算）

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{Event, EventType};

/// 用户活动汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserActivity {
    pub user_id: String,
    pub total_events: u64,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub event_counts: BTreeMap<EventType, u64>,
    /// 最近的事件，按时间倒序
    pub recent_events: Vec<Event>,
}

impl UserActivity {
    pub const RECENT_LIMIT: usize = 20;

    /// 从原始事件计算，没有事件时返回 `None`
    pub fn from_events(
        user_id: &str,
        events: impl IntoIterator<Item = Event>,
    ) -> Option<UserActivity> {
        let mut events: Vec<Event> = events
            .into_iter()
            .filter(|e| e.user_id() == Some(user_id))
            .collect();
        if events.is_empty() {
            return None;
        }

        let mut event_counts = BTreeMap::new();
        for event in &events {
            *event_counts.entry(event.event_type()).or_insert(0) += 1;
        }

        events.sort_by(|a, b| b.occurred_at().cmp(&a.occurred_at()));
        let last_seen_at = events[0].occurred_at();
        let first_seen_at = events[events.len() - 1].occurred_at();
        let total_events = events.len() as u64;
        events.truncate(Self::RECENT_LIMIT);

        Some(UserActivity {
            user_id: user_id.to_string(),
            total_events,
            first_seen_at,
            last_seen_at,
            event_counts,
            recent_events: events,
        })
    }

    /// 从预聚合的计数恢复（SQL 后端）
    pub fn from_parts(
        user_id: &str,
        event_counts: BTreeMap<EventType, u64>,
        first_seen_at: DateTime<Utc>,
        last_seen_at: DateTime<Utc>,
        mut recent_events: Vec<Event>,
    ) -> Option<UserActivity> {
        let total_events: u64 = event_counts.values().sum();
        if total_events == 0 {
            return None;
        }

        recent_events.sort_by(|a, b| b.occurred_at().cmp(&a.occurred_at()));
        recent_events.truncate(Self::RECENT_LIMIT);

        Some(UserActivity {
            user_id: user_id.to_string(),
            total_events,
            first_seen_at,
            last_seen_at,
            event_counts,
            recent_events,
        })
    }

    pub fn count_of(&self, event_type: EventType) -> u64 {
        self.event_counts.get(&event_type).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event_at(event_type: EventType, user: &str, minutes_ago: i64) -> Event {
        Event::for_user(event_type, user)
            .unwrap()
            .with_occurred_at(Utc::now() - Duration::minutes(minutes_ago))
    }

    #[test]
    fn test_no_events_is_absent() {
        assert!(UserActivity::from_events("u1", Vec::new()).is_none());
        let others = vec![event_at(EventType::PageView, "u2", 1)];
        assert!(UserActivity::from_events("u1", others).is_none());
    }

    #[test]
    fn test_summary() {
        let events = vec![
            event_at(EventType::PageView, "u1", 30),
            event_at(EventType::AddToCart, "u1", 20),
            event_at(EventType::PageView, "u1", 10),
            event_at(EventType::PageView, "u2", 5),
        ];
        let activity = UserActivity::from_events("u1", events).unwrap();

        assert_eq!(activity.total_events, 3);
        assert_eq!(activity.count_of(EventType::PageView), 2);
        assert_eq!(activity.count_of(EventType::AddToCart), 1);
        assert_eq!(activity.count_of(EventType::OrderCreated), 0);
        assert!(activity.first_seen_at < activity.last_seen_at);
        assert_eq!(activity.recent_events[0].occurred_at(), activity.last_seen_at);
    }

    #[test]
    fn test_recent_events_capped() {
        let events: Vec<Event> = (0..30)
            .map(|i| event_at(EventType::ProductView, "u1", i))
            .collect();
        let activity = UserActivity::from_events("u1", events).unwrap();

        assert_eq!(activity.total_events, 30);
        assert_eq!(activity.recent_events.len(), UserActivity::RECENT_LIMIT);
    }

    #[test]
    fn test_from_parts_empty_counts() {
        let now = Utc::now();
        assert!(UserActivity::from_parts("u1", BTreeMap::new(), now, now, vec![]).is_none());
    }
}
