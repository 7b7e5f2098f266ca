//! 领域服务

mod email_service;

pub use email_service::*;
