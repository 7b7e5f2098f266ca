//! 领域层

pub mod analytics;
pub mod cart;
pub mod order;
pub mod payment;
pub mod repositories;
pub mod services;
pub mod user;
pub mod value_objects;
pub mod webhook;
