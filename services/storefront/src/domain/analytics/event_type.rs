//! 可追踪的领域事件类型

use serde::{Deserialize, Serialize};
use shop_errors::AppError;
use std::fmt;
use std::str::FromStr;

/// 事件类型（封闭集合，共 15 种）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    UserRegistered,
    UserLogin,
    UserLogout,
    PageView,
    ProductView,
    Search,
    AddToCart,
    RemoveFromCart,
    OrderCreated,
    OrderCompleted,
    OrderCancelled,
    PaymentSucceeded,
    PaymentFailed,
    EmailSent,
    SessionStarted,
}

/// 事件类型分组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Account,
    Browsing,
    Cart,
    Order,
    Payment,
    Engagement,
}

impl EventType {
    pub const ALL: [EventType; 15] = [
        EventType::UserRegistered,
        EventType::UserLogin,
        EventType::UserLogout,
        EventType::PageView,
        EventType::ProductView,
        EventType::Search,
        EventType::AddToCart,
        EventType::RemoveFromCart,
        EventType::OrderCreated,
        EventType::OrderCompleted,
        EventType::OrderCancelled,
        EventType::PaymentSucceeded,
        EventType::PaymentFailed,
        EventType::EmailSent,
        EventType::SessionStarted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::UserRegistered => "USER_REGISTERED",
            EventType::UserLogin => "USER_LOGIN",
            EventType::UserLogout => "USER_LOGOUT",
            EventType::PageView => "PAGE_VIEW",
            EventType::ProductView => "PRODUCT_VIEW",
            EventType::Search => "SEARCH",
            EventType::AddToCart => "ADD_TO_CART",
            EventType::RemoveFromCart => "REMOVE_FROM_CART",
            EventType::OrderCreated => "ORDER_CREATED",
            EventType::OrderCompleted => "ORDER_COMPLETED",
            EventType::OrderCancelled => "ORDER_CANCELLED",
            EventType::PaymentSucceeded => "PAYMENT_SUCCEEDED",
            EventType::PaymentFailed => "PAYMENT_FAILED",
            EventType::EmailSent => "EMAIL_SENT",
            EventType::SessionStarted => "SESSION_STARTED",
        }
    }

    pub fn category(&self) -> EventCategory {
        match self {
            EventType::UserRegistered | EventType::UserLogin | EventType::UserLogout => {
                EventCategory::Account
            }
            EventType::PageView | EventType::ProductView | EventType::Search => {
                EventCategory::Browsing
            }
            EventType::AddToCart | EventType::RemoveFromCart => EventCategory::Cart,
            EventType::OrderCreated | EventType::OrderCompleted | EventType::OrderCancelled => {
                EventCategory::Order
            }
            EventType::PaymentSucceeded | EventType::PaymentFailed => EventCategory::Payment,
            EventType::EmailSent | EventType::SessionStarted => EventCategory::Engagement,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown event type: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_tags_distinct() {
        let tags: HashSet<&str> = EventType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(tags.len(), 15);
    }

    #[test]
    fn test_parse_matches_serde() {
        for event_type in EventType::ALL {
            let json = serde_json::to_value(event_type).unwrap();
            assert_eq!(json, serde_json::Value::String(event_type.as_str().to_string()));
            assert_eq!(event_type.as_str().parse::<EventType>().unwrap(), event_type);
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = "CHECKOUT_STARTED".parse::<EventType>().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!("page_view".parse::<EventType>().is_err());
    }

    #[test]
    fn test_category() {
        assert_eq!(EventType::AddToCart.category(), EventCategory::Cart);
        assert_eq!(EventType::PaymentFailed.category(), EventCategory::Payment);
        assert_eq!(EventType::SessionStarted.category(), EventCategory::Engagement);
    }
}
