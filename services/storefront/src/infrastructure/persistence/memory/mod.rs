//! 内存仓储实现（开发与测试）

mod analytics_repository;
mod cart_repository;
mod order_repository;
mod processed_event_repository;

pub use analytics_repository::InMemoryAnalyticsRepository;
pub use cart_repository::InMemoryCartRepository;
pub use order_repository::{
    InMemoryOrderRepository, InMemoryPaymentRepository, InMemoryUserRepository,
};
pub use processed_event_repository::InMemoryProcessedEventRepository;
