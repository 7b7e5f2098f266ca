//! 支付 Repository trait

use async_trait::async_trait;
use shop_errors::AppResult;

use crate::domain::order::Order;
use crate::domain::payment::{Payment, PaymentId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: PaymentId) -> AppResult<Option<Payment>>;

    /// 插入或更新支付
    async fn save(&self, payment: &Payment) -> AppResult<()>;

    /// 原子地保存支付及其订单，任一失败则两者都不落盘
    async fn save_with_order(&self, payment: &Payment, order: &Order) -> AppResult<()>;
}
