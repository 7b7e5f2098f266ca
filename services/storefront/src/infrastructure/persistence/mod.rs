//! 持久化

pub mod memory;
pub mod migrations;
pub mod postgres;
