//! Email 适配器
//!
//! 提供邮件发送功能，支持：
//! - 异步 SMTP 发送
//! - tera 模板渲染（HTML + 纯文本）

mod client;
mod template;

pub use client::{EmailClient, EmailMessage};
pub use shop_config::EmailConfig;
pub use template::EmailTemplate;

use shop_errors::AppResult;

/// 邮件发送接口
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    /// 发送一封邮件
    async fn send(&self, message: EmailMessage) -> AppResult<()>;

    /// 发送纯文本邮件
    async fn send_text_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        self.send(EmailMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: None,
            text_body: body.to_string(),
        })
        .await
    }

    /// 发送 HTML 邮件，附带纯文本备用正文
    async fn send_html_email(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
        text_body: &str,
    ) -> AppResult<()> {
        self.send(EmailMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: Some(html_body.to_string()),
            text_body: text_body.to_string(),
        })
        .await
    }
}
