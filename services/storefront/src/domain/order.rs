//! 订单实体（支付回调只驱动状态流转）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_common::UserId;
use shop_errors::{AppError, AppResult};
use std::fmt;
use std::str::FromStr;

use super::value_objects::Money;

/// 订单 ID
pub type OrderId = i64;

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    PaymentFailed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::PaymentFailed => "PAYMENT_FAILED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "PAYMENT_FAILED" => Ok(OrderStatus::PaymentFailed),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "DELIVERED" => Ok(OrderStatus::Delivered),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(AppError::internal(format!("Unknown order status: {}", other))),
        }
    }
}

/// 订单
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: OrderId, user_id: UserId, total: Money) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            status: OrderStatus::Pending,
            total,
            created_at: now,
            updated_at: now,
        }
    }

    /// 支付成功后确认订单
    ///
    /// 返回 `Ok(false)` 表示已处于目标状态。
    pub fn confirm(&mut self) -> AppResult<bool> {
        self.transition(OrderStatus::Confirmed, |from| {
            matches!(from, OrderStatus::Pending | OrderStatus::PaymentFailed)
        })
    }

    /// 标记支付失败
    pub fn mark_payment_failed(&mut self) -> AppResult<bool> {
        self.transition(OrderStatus::PaymentFailed, |from| {
            from == OrderStatus::Pending
        })
    }

    /// 取消订单
    pub fn cancel(&mut self) -> AppResult<bool> {
        self.transition(OrderStatus::Cancelled, |from| {
            from != OrderStatus::Delivered
        })
    }

    fn transition(
        &mut self,
        target: OrderStatus,
        allowed_from: impl Fn(OrderStatus) -> bool,
    ) -> AppResult<bool> {
        if self.status == target {
            return Ok(false);
        }
        if !allowed_from(self.status) {
            return Err(AppError::failed_precondition(format!(
                "Order {} cannot move from {} to {}",
                self.id, self.status, target
            )));
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(true)
    }
}
