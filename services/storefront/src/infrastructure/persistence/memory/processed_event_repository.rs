//! 内存已处理 webhook 事件仓储

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shop_errors::AppResult;
use tokio::sync::RwLock;

use crate::domain::repositories::ProcessedEventRepository;
use crate::domain::webhook::ProcessedWebhookEvent;

#[derive(Default)]
pub struct InMemoryProcessedEventRepository {
    events: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryProcessedEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessedEventRepository for InMemoryProcessedEventRepository {
    async fn try_claim(&self, event: &ProcessedWebhookEvent) -> AppResult<bool> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.event_id) {
            return Ok(false);
        }
        events.insert(event.event_id.clone(), event.processed_at);
        Ok(true)
    }

    async fn release(&self, event_id: &str) -> AppResult<()> {
        self.events.write().await.remove(event_id);
        Ok(())
    }

    async fn exists(&self, event_id: &str) -> AppResult<bool> {
        Ok(self.events.read().await.contains_key(event_id))
    }

    async fn cleanup_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|_, processed_at| *processed_at >= cutoff);
        Ok((before - events.len()) as u64)
    }
}
