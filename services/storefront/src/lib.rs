//! Storefront 服务
//!
//! 分层结构：
//! - `domain`: 实体、值对象与仓储接口
//! - `application`: 命令与查询处理器、webhook 用例
//! - `infrastructure`: PostgreSQL 与内存仓储、邮件通知、签名校验、metrics
//! - `api`: axum HTTP 接口
//! - `container`: 依赖组装

pub mod api;
pub mod application;
pub mod container;
pub mod domain;
pub mod infrastructure;
