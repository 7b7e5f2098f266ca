//! 已处理 webhook 事件 Repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shop_errors::AppResult;

use crate::domain::webhook::ProcessedWebhookEvent;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcessedEventRepository: Send + Sync {
    /// 原子地登记事件，已存在时返回 `false`
    async fn try_claim(&self, event: &ProcessedWebhookEvent) -> AppResult<bool>;

    /// 撤销登记（处理失败后允许重投）
    async fn release(&self, event_id: &str) -> AppResult<()>;

    /// 事件是否已登记
    async fn exists(&self, event_id: &str) -> AppResult<bool>;

    /// 删除早于 `cutoff` 的记录，返回删除数量
    async fn cleanup_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}
