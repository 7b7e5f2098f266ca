//! 写操作

use async_trait::async_trait;
use shop_errors::AppResult;

/// 改变状态的请求，例如加入购物车、记录分析事件
///
/// `Result` 是处理成功后返回给调用方的值（新建事件的 ID、更新后的购物车等）。
pub trait Command: Send + Sync {
    type Result: Send;
}

/// 命令处理器
///
/// 一个处理器可以为多个命令实现该 trait，共享同一组仓储依赖。
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    async fn handle(&self, command: C) -> AppResult<C::Result>;
}
