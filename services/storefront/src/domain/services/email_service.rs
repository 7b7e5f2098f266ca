//! 事务邮件服务 trait

use async_trait::async_trait;
use shop_errors::AppResult;

use crate::domain::order::Order;
use crate::domain::user::User;

/// 向用户发送事务邮件
///
/// 传输失败返回 `ExternalService` 错误，是否重试由调用方决定。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailService: Send + Sync {
    /// 发送邮箱验证邮件
    async fn send_verification_email(&self, user: &User, verification_token: &str)
    -> AppResult<()>;

    /// 发送密码重置邮件
    async fn send_password_reset_email(&self, user: &User, reset_token: &str) -> AppResult<()>;

    /// 发送订单确认邮件
    async fn send_order_confirmation(&self, user: &User, order: &Order) -> AppResult<()>;

    /// 发送支付失败通知
    async fn send_payment_failed(&self, user: &User, order: &Order) -> AppResult<()>;
}
