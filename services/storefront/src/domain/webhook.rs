//! 已处理的 webhook 事件（幂等记录）

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedWebhookEvent {
    pub event_id: String,
    pub processed_at: DateTime<Utc>,
}

impl ProcessedWebhookEvent {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            processed_at: Utc::now(),
        }
    }
}
