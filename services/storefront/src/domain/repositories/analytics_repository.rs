//! 分析事件 Repository trait

use async_trait::async_trait;
use shop_errors::AppResult;

use crate::domain::analytics::{Event, EventFilter, Report, ReportParams, UserActivity};

/// 分析事件存储：持久化事件并回答活动、报表查询
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// 持久化事件，后端不可用时返回错误
    async fn save_event(&self, event: &Event) -> AppResult<()>;

    /// 查询用户活动，没有任何事件时返回 `None`
    async fn find_user_activity_by_user_id(&self, user_id: &str)
    -> AppResult<Option<UserActivity>>;

    /// 生成报表，未知报表类型或缺少参数时返回校验错误
    async fn generate_report(&self, report_type: &str, params: &ReportParams)
    -> AppResult<Report>;

    /// 按条件列出事件（时间倒序）
    async fn find_events(&self, filter: &EventFilter) -> AppResult<Vec<Event>>;
}
