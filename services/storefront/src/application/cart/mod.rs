//! 购物车用例

mod commands;
mod handlers;
mod queries;

pub use commands::*;
pub use handlers::*;
pub use queries::*;
