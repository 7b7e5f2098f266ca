//! 事件查询条件

use chrono::{DateTime, Utc};
use shop_errors::{AppError, AppResult};

use super::{Event, EventType};

/// 事件列表查询条件，结果按时间倒序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    pub user_id: Option<String>,
    /// 起始时刻（含）
    pub from: Option<DateTime<Utc>>,
    /// 结束时刻（不含）
    pub to: Option<DateTime<Utc>>,
    pub limit: usize,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            event_type: None,
            user_id: None,
            from: None,
            to: None,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl EventFilter {
    pub const DEFAULT_LIMIT: usize = 100;
    pub const MAX_LIMIT: usize = 500;

    /// 校验条件
    pub fn validate(&self) -> AppResult<()> {
        if self.limit == 0 || self.limit > Self::MAX_LIMIT {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {}",
                Self::MAX_LIMIT
            )));
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from >= to {
                return Err(AppError::validation("'from' must be before 'to'"));
            }
        }
        Ok(())
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.event_type.is_none_or(|t| event.event_type() == t)
            && self
                .user_id
                .as_deref()
                .is_none_or(|u| event.user_id() == Some(u))
            && self.from.is_none_or(|from| event.occurred_at() >= from)
            && self.to.is_none_or(|to| event.occurred_at() < to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_limit_bounds() {
        assert!(EventFilter::default().validate().is_ok());
        let filter = EventFilter {
            limit: 501,
            ..Default::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_matches() {
        let event = Event::for_user(EventType::Search, "u1").unwrap();
        let filter = EventFilter {
            event_type: Some(EventType::Search),
            user_id: Some("u1".into()),
            from: Some(event.occurred_at() - Duration::seconds(1)),
            ..Default::default()
        };
        assert!(filter.matches(&event));

        let other_user = EventFilter {
            user_id: Some("u2".into()),
            ..Default::default()
        };
        assert!(!other_user.matches(&event));
    }
}
