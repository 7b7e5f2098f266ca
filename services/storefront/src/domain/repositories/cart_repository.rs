//! 购物车 Repository trait

use async_trait::async_trait;
use shop_common::UserId;
use shop_errors::AppResult;

use crate::domain::cart::Cart;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// 按用户 upsert：已有购物车时保留其 ID 与创建时间并替换内容
    ///
    /// 返回持久化后的购物车
    async fn save(&self, cart: &Cart) -> AppResult<Cart>;

    /// 根据用户查找购物车
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Option<Cart>>;

    /// 删除用户的购物车，不存在时视为成功
    async fn delete(&self, cart: &Cart) -> AppResult<()>;
}
