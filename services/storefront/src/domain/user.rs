//! 用户实体

use chrono::{DateTime, Utc};
use serde::Serialize;
use shop_common::UserId;

use super::value_objects::Email;

/// 用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        id: UserId,
        email: Email,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            email,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email_verified: false,
            created_at: Utc::now(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// 邮件称呼，名为空时退回邮箱
    pub fn greeting_name(&self) -> &str {
        if self.first_name.trim().is_empty() {
            self.email.as_str()
        } else {
            &self.first_name
        }
    }
}
