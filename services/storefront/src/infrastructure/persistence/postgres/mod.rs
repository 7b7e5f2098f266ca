//! PostgreSQL 仓储实现

mod analytics_repository;
mod cart_repository;
mod order_repository;
mod payment_repository;
mod processed_event_repository;
mod user_repository;

pub use analytics_repository::PostgresAnalyticsRepository;
pub use cart_repository::PostgresCartRepository;
pub use order_repository::PostgresOrderRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use processed_event_repository::PostgresProcessedEventRepository;
pub use user_repository::PostgresUserRepository;
