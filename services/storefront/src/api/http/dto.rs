//! HTTP 请求与响应结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shop_common::UserId;
use shop_errors::{AppError, AppResult};
use uuid::Uuid;

use crate::domain::analytics::{EventFilter, EventType};
use crate::domain::cart::{Cart, CartItem, ProductId};

/// 把请求解析失败转换为校验错误
pub fn bad_request(rejection: impl std::fmt::Display) -> AppError {
    AppError::validation(rejection.to_string())
}

#[derive(Debug, Deserialize)]
pub struct TrackEventRequest {
    pub event_type: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub payload: Option<Value>,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrackEventResponse {
    pub id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListEventsParams {
    pub event_type: Option<String>,
    pub user_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl TryFrom<ListEventsParams> for EventFilter {
    type Error = AppError;

    fn try_from(params: ListEventsParams) -> AppResult<Self> {
        let event_type = params
            .event_type
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<EventType>)
            .transpose()?;
        let filter = EventFilter {
            event_type,
            user_id: params
                .user_id
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            from: params.from,
            to: params.to,
            limit: params.limit.unwrap_or(EventFilter::DEFAULT_LIMIT),
        };
        filter.validate()?;
        Ok(filter)
    }
}

#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: i64,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartItemResponse {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: i64,
    pub subtotal: i64,
}

impl CartItemResponse {
    fn from_item(item: &CartItem) -> AppResult<Self> {
        Ok(Self {
            product_id: item.product_id,
            quantity: item.quantity.value(),
            unit_price: item.unit_price.amount,
            subtotal: item.subtotal()?.amount,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CartResponse {
    pub id: Uuid,
    pub user_id: UserId,
    pub items: Vec<CartItemResponse>,
    pub item_count: u32,
    pub total: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Cart> for CartResponse {
    type Error = AppError;

    fn try_from(cart: &Cart) -> AppResult<Self> {
        let total = cart.total()?;
        Ok(Self {
            id: cart.id(),
            user_id: cart.user_id(),
            items: cart
                .items()
                .iter()
                .map(CartItemResponse::from_item)
                .collect::<AppResult<_>>()?,
            item_count: cart.item_count(),
            total: total.amount,
            currency: total.currency.code().to_string(),
            created_at: cart.created_at(),
            updated_at: cart.updated_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_to_filter() {
        let filter = EventFilter::try_from(ListEventsParams {
            event_type: Some("SEARCH".into()),
            user_id: Some(" u1 ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.event_type, Some(EventType::Search));
        assert_eq!(filter.user_id.as_deref(), Some("u1"));
        assert_eq!(filter.limit, EventFilter::DEFAULT_LIMIT);
    }

    #[test]
    fn test_list_params_reject_unknown_type() {
        let result = EventFilter::try_from(ListEventsParams {
            event_type: Some("NOPE".into()),
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
