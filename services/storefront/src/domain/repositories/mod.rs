//! Repository traits

mod analytics_repository;
mod cart_repository;
mod order_repository;
mod payment_repository;
mod processed_event_repository;
mod user_repository;

pub use analytics_repository::*;
pub use cart_repository::*;
pub use order_repository::*;
pub use payment_repository::*;
pub use processed_event_repository::*;
pub use user_repository::*;
