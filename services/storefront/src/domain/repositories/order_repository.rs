//! 订单 Repository trait

use async_trait::async_trait;
use shop_errors::AppResult;

use crate::domain::order::{Order, OrderId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>>;

    /// 插入或更新订单
    async fn save(&self, order: &Order) -> AppResult<()>;
}
