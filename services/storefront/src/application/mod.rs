//! Application 层：用例编排

pub mod analytics;
pub mod cart;
pub mod webhook;
