//! HTTP 接口

mod analytics;
mod carts;
pub mod dto;
mod health;
mod router;
mod webhook;

pub use router::build_router;
