//! 支付 webhook 用例接口

use async_trait::async_trait;
use shop_errors::AppResult;
use std::fmt;

/// 已通过签名校验的 webhook 事件
#[derive(Debug, Clone)]
pub struct ProcessWebhookEventRequest {
    pub event_id: String,
    pub event_type: String,
    /// 原始 JSON 请求体
    pub payload: String,
    /// 事件创建时间（Unix 秒）
    pub created: i64,
}

/// 成功处理后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// 状态已更新（或已处于目标状态）
    Processed,
    /// 重复投递，未做任何处理
    Duplicate,
    /// 事件与本系统无关或无法关联，已跳过
    Ignored,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Processed => "processed",
            WebhookOutcome::Duplicate => "duplicate",
            WebhookOutcome::Ignored => "ignored",
        }
    }
}

impl fmt::Display for WebhookOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 处理支付渠道的 webhook 事件
///
/// 返回错误时由 HTTP 层映射为状态码，5xx 会触发渠道重投。
#[async_trait]
pub trait WebhookProcessingUseCase: Send + Sync {
    async fn execute(&self, request: ProcessWebhookEventRequest) -> AppResult<WebhookOutcome>;
}
