//! shop-bootstrap - 统一服务启动骨架
//!
//! 配置加载、日志初始化、基础设施创建与 HTTP 服务的优雅关闭

mod infrastructure;
mod metrics;
mod retry;
mod runtime;
mod shutdown;
mod starter;

pub use infrastructure::*;
pub use metrics::*;
pub use retry::*;
pub use runtime::*;
pub use shutdown::*;
pub use starter::*;
