//! 分析命令

use chrono::{DateTime, Utc};
use serde_json::Value;
use shop_cqrs_core::Command;
use uuid::Uuid;

use crate::domain::analytics::RequestContext;

/// 记录一个分析事件
#[derive(Debug, Clone)]
pub struct TrackEventCommand {
    pub event_type: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub payload: Option<Value>,
    /// 客户端时间，缺省为服务器当前时间
    pub occurred_at: Option<DateTime<Utc>>,
    pub context: RequestContext,
}

impl Command for TrackEventCommand {
    type Result = Uuid;
}
