//! Infrastructure 层

pub mod metrics;
pub mod notification;
pub mod persistence;
pub mod webhook;
