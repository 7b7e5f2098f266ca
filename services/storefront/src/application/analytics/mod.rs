//! 分析用例

mod commands;
mod handlers;
mod queries;
mod tracker;

pub use commands::*;
pub use handlers::*;
pub use queries::*;
pub use tracker::EventTracker;
