//! 读操作

use async_trait::async_trait;
use shop_errors::AppResult;

/// 不改变状态的请求
///
/// 查找类查询以 `Option` 表示不存在，不返回 NotFound 错误。
pub trait Query: Send + Sync {
    type Result: Send;
}

#[async_trait]
pub trait QueryHandler<Q: Query>: Send + Sync {
    async fn handle(&self, query: Q) -> AppResult<Q::Result>;
}
