//! 支付实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_errors::{AppError, AppResult};
use std::fmt;
use std::str::FromStr;

use super::order::OrderId;
use super::value_objects::Money;

/// 支付 ID
pub type PaymentId = i64;

/// 支付状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Processing,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Processing => "PROCESSING",
            PaymentStatus::RequiresAction => "REQUIRES_ACTION",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    /// 终态不再接受回调驱动的变更
    pub fn is_final(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Refunded)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PROCESSING" => Ok(PaymentStatus::Processing),
            "REQUIRES_ACTION" => Ok(PaymentStatus::RequiresAction),
            "COMPLETED" => Ok(PaymentStatus::Completed),
            "FAILED" => Ok(PaymentStatus::Failed),
            "CANCELLED" => Ok(PaymentStatus::Cancelled),
            "REFUNDED" => Ok(PaymentStatus::Refunded),
            other => Err(AppError::internal(format!(
                "Unknown payment status: {}",
                other
            ))),
        }
    }
}

/// 支付
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    pub status: PaymentStatus,
    pub amount: Money,
    /// 支付渠道侧的交易号
    pub transaction_id: Option<String>,
    pub failure_reason: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(id: PaymentId, order_id: OrderId, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id,
            order_id,
            status: PaymentStatus::Pending,
            amount,
            transaction_id: None,
            failure_reason: None,
            processed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 支付完成
    ///
    /// 返回 `Ok(false)` 表示已处于该状态（重复投递）。
    pub fn complete(
        &mut self,
        transaction_id: impl Into<String>,
        processed_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        if !self.transition(PaymentStatus::Completed)? {
            return Ok(false);
        }
        self.transaction_id = Some(transaction_id.into());
        self.failure_reason = None;
        self.processed_at = Some(processed_at);
        Ok(true)
    }

    /// 支付失败
    pub fn fail(&mut self, reason: Option<String>) -> AppResult<bool> {
        if !self.transition(PaymentStatus::Failed)? {
            return Ok(false);
        }
        self.failure_reason = reason;
        Ok(true)
    }

    pub fn require_action(&mut self) -> AppResult<bool> {
        self.transition(PaymentStatus::RequiresAction)
    }

    pub fn mark_processing(&mut self) -> AppResult<bool> {
        self.transition(PaymentStatus::Processing)
    }

    pub fn cancel(&mut self) -> AppResult<bool> {
        self.transition(PaymentStatus::Cancelled)
    }

    fn transition(&mut self, target: PaymentStatus) -> AppResult<bool> {
        if self.status == target {
            return Ok(false);
        }
        if self.status.is_final() {
            return Err(AppError::failed_precondition(format!(
                "Payment {} is {} and cannot move to {}",
                self.id, self.status, target
            )));
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment() -> Payment {
        Payment::new(10, 1, Money::usd(2500))
    }

    #[test]
    fn test_complete_sets_transaction() {
        let mut p = payment();
        let at = Utc::now();
        assert!(p.complete("pi_123", at).unwrap());
        assert_eq!(p.status, PaymentStatus::Completed);
        assert_eq!(p.transaction_id.as_deref(), Some("pi_123"));
        assert_eq!(p.processed_at, Some(at));

        // 重复投递
        assert!(!p.complete("pi_123", Utc::now()).unwrap());
        assert_eq!(p.processed_at, Some(at));
    }

    #[test]
    fn test_final_states_reject_changes() {
        let mut p = payment();
        p.complete("pi_123", Utc::now()).unwrap();
        let err = p.fail(Some("card_declined".into())).unwrap_err();
        assert!(matches!(err, AppError::FailedPrecondition(_)));
        assert!(p.cancel().is_err());

        p.status = PaymentStatus::Refunded;
        assert!(p.mark_processing().is_err());
    }

    #[test]
    fn test_failed_payment_can_still_complete() {
        let mut p = payment();
        assert!(p.fail(Some("insufficient_funds".into())).unwrap());
        assert_eq!(p.failure_reason.as_deref(), Some("insufficient_funds"));
        assert!(p.complete("pi_456", Utc::now()).unwrap());
        assert!(p.failure_reason.is_none());
    }

    #[test]
    fn test_intermediate_states() {
        let mut p = payment();
        assert!(p.mark_processing().unwrap());
        assert!(p.require_action().unwrap());
        assert!(!p.require_action().unwrap());
        assert_eq!(p.status, PaymentStatus::RequiresAction);
    }
}
