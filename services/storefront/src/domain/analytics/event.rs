//! 分析事件实体

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use shop_errors::{AppError, AppResult};
use uuid::Uuid;

use super::EventType;

/// 请求上下文（可选）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

/// 分析事件
///
/// 创建后不可变；`with_*` 方法消费并返回新值，只在保存前使用。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    id: Uuid,
    event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    occurred_at: DateTime<Utc>,
    payload: Value,
    #[serde(flatten)]
    context: RequestContext,
}

fn normalize_id(id: Option<String>) -> Option<String> {
    id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn normalize_payload(payload: Value) -> AppResult<Value> {
    match payload {
        Value::Null => Ok(Value::Object(Map::new())),
        Value::Object(_) => Ok(payload),
        other => Err(AppError::validation(format!(
            "Event payload must be a JSON object, got {}",
            other
        ))),
    }
}

impl Event {
    /// 创建新事件，`user_id` 与 `session_id` 至少一个非空
    pub fn new(
        event_type: EventType,
        user_id: Option<String>,
        session_id: Option<String>,
    ) -> AppResult<Self> {
        let user_id = normalize_id(user_id);
        let session_id = normalize_id(session_id);
        if user_id.is_none() && session_id.is_none() {
            return Err(AppError::validation(
                "Event requires a user_id or a session_id",
            ));
        }

        Ok(Self {
            id: shop_common::new_id(),
            event_type,
            user_id,
            session_id,
            occurred_at: Utc::now(),
            payload: Value::Object(Map::new()),
            context: RequestContext::default(),
        })
    }

    /// 用户事件的快捷构造
    pub fn for_user(event_type: EventType, user_id: impl Into<String>) -> AppResult<Self> {
        Self::new(event_type, Some(user_id.into()), None)
    }

    /// 从存储恢复
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        event_type: EventType,
        user_id: Option<String>,
        session_id: Option<String>,
        occurred_at: DateTime<Utc>,
        payload: Value,
        context: RequestContext,
    ) -> Self {
        Self {
            id,
            event_type,
            user_id,
            session_id,
            occurred_at,
            payload,
            context,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> AppResult<Self> {
        self.payload = normalize_payload(payload)?;
        Ok(self)
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}
