//! 基于 SMTP 的事务邮件服务

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use shop_adapter_email::{EmailMessage, EmailSender, EmailTemplate};
use shop_config::AppConfig;
use shop_errors::AppResult;
use tracing::{info, warn};

use super::templates;
use crate::domain::order::Order;
use crate::domain::services::EmailService;
use crate::domain::user::User;
use crate::infrastructure::metrics::record_email_sent;

const VERIFICATION_EXPIRY: &str = "24 hours";
const PASSWORD_RESET_EXPIRY: &str = "1 hour";

/// 事务邮件服务
pub struct SmtpEmailService {
    sender: Arc<dyn EmailSender>,
    templates: EmailTemplate,
    base_url: String,
}

impl SmtpEmailService {
    pub fn new(
        sender: Arc<dyn EmailSender>,
        templates: EmailTemplate,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            templates,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 按配置创建：内置模板，`email.template_dir` 中的同名模板优先
    pub fn from_config(sender: Arc<dyn EmailSender>, config: &AppConfig) -> AppResult<Self> {
        let defaults = EmailTemplate::from_strings(templates::builtin())?;
        let templates = match config.email.template_dir.as_deref() {
            Some(dir) => EmailTemplate::new(dir)?.with_defaults(&defaults)?,
            None => defaults,
        };
        Ok(Self::new(sender, templates, config.base_url()))
    }

    async fn deliver(
        &self,
        kind: &str,
        to: &str,
        subject: &str,
        context: serde_json::Value,
    ) -> AppResult<()> {
        let (html, text) = self.templates.render_pair(kind, &context)?;
        let result = self
            .sender
            .send(EmailMessage {
                to: to.to_string(),
                subject: subject.to_string(),
                html_body: Some(html),
                text_body: text,
            })
            .await;

        record_email_sent(kind, result.is_ok());
        match &result {
            Ok(()) => info!(kind, to = %to, "Email sent"),
            Err(e) => warn!(kind, to = %to, error = %e, "Failed to send email"),
        }
        result
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_verification_email(
        &self,
        user: &User,
        verification_token: &str,
    ) -> AppResult<()> {
        let link = format!(
            "{}/api/auth/verify-email?token={}",
            self.base_url, verification_token
        );
        self.deliver(
            templates::VERIFICATION,
            user.email.as_str(),
            "Verify your email address",
            json!({
                "first_name": user.greeting_name(),
                "link": link,
                "expires_in": VERIFICATION_EXPIRY,
            }),
        )
        .await
    }

    async fn send_password_reset_email(&self, user: &User, reset_token: &str) -> AppResult<()> {
        let link = format!("{}/reset-password?token={}", self.base_url, reset_token);
        self.deliver(
            templates::PASSWORD_RESET,
            user.email.as_str(),
            "Reset your password",
            json!({
                "first_name": user.greeting_name(),
                "link": link,
                "expires_in": PASSWORD_RESET_EXPIRY,
            }),
        )
        .await
    }

    async fn send_order_confirmation(&self, user: &User, order: &Order) -> AppResult<()> {
        self.deliver(
            templates::ORDER_CONFIRMATION,
            user.email.as_str(),
            &format!("Order #{} confirmed", order.id),
            json!({
                "first_name": user.greeting_name(),
                "order_id": order.id,
                "total": order.total.to_string(),
                "link": format!("{}/orders/{}", self.base_url, order.id),
            }),
        )
        .await
    }

    async fn send_payment_failed(&self, user: &User, order: &Order) -> AppResult<()> {
        self.deliver(
            templates::PAYMENT_FAILED,
            user.email.as_str(),
            &format!("Payment failed for order #{}", order.id),
            json!({
                "first_name": user.greeting_name(),
                "order_id": order.id,
                "total": order.total.to_string(),
                "link": format!("{}/orders/{}/payment", self.base_url, order.id),
            }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Email, Money};
    use shop_common::UserId;
    use shop_errors::AppError;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send(&self, message: EmailMessage) -> AppResult<()> {
            if self.fail {
                return Err(AppError::external_service("SMTP connection refused"));
            }
            self.sent.lock().await.push(message);
            Ok(())
        }
    }

    fn user() -> User {
        User::new(UserId::new(7), Email::new("ada@example.com").unwrap(), "Ada", "Lovelace")
    }

    fn service(sender: Arc<RecordingSender>) -> SmtpEmailService {
        let templates = EmailTemplate::from_strings(templates::builtin()).unwrap();
        SmtpEmailService::new(sender, templates, "https://shop.example.com/")
    }

    #[tokio::test]
    async fn test_verification_email() {
        let sender = Arc::new(RecordingSender::default());
        service(sender.clone())
            .send_verification_email(&user(), "tok123")
            .await
            .unwrap();

        let sent = sender.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.com");
        assert!(sent[0].text_body.starts_with("Hello Ada"));
        assert!(sent[0]
            .text_body
            .contains("https://shop.example.com/api/auth/verify-email?token=tok123"));
        assert!(sent[0].text_body.contains("24 hours"));
        assert!(sent[0].text_body.contains("The E-commerce Team"));
        assert!(sent[0].html_body.is_some());
    }

    #[tokio::test]
    async fn test_password_reset_email() {
        let sender = Arc::new(RecordingSender::default());
        service(sender.clone())
            .send_password_reset_email(&user(), "reset456")
            .await
            .unwrap();

        let sent = sender.sent.lock().await;
        assert!(sent[0]
            .text_body
            .contains("https://shop.example.com/reset-password?token=reset456"));
        assert!(sent[0].text_body.contains("1 hour"));
    }

    #[tokio::test]
    async fn test_order_confirmation_email() {
        let sender = Arc::new(RecordingSender::default());
        let order = Order::new(31, UserId::new(7), Money::usd(2599));
        service(sender.clone())
            .send_order_confirmation(&user(), &order)
            .await
            .unwrap();

        let sent = sender.sent.lock().await;
        assert_eq!(sent[0].subject, "Order #31 confirmed");
        assert!(sent[0].text_body.contains("25.99 USD"));
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces() {
        let sender = Arc::new(RecordingSender {
            fail: true,
            ..Default::default()
        });
        let err = service(sender)
            .send_verification_email(&user(), "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }
}
