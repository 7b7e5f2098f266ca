//! 邮件客户端实现

use crate::{EmailConfig, EmailSender};
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use shop_errors::{AppError, AppResult};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 邮件消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: String,
}

/// 邮件客户端
///
/// 传输层在构造时建立一次，之后并发复用。
pub struct EmailClient {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailClient {
    /// 创建新的邮件客户端
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|e| AppError::validation(format!("Invalid from address: {}", e)))?;

        let transport = Self::build_transport(config)?;
        Ok(Self { from, transport })
    }

    /// 构建 SMTP 传输
    fn build_transport(config: &EmailConfig) -> AppResult<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host).map_err(
                |e| AppError::internal(format!("Failed to create SMTP transport: {}", e)),
            )?
        } else {
            // 本地开发用的 SMTP（如 MailHog）不支持 TLS
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        }
        .port(config.smtp_port)
        .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().clone(),
            ));
        }

        Ok(builder.build())
    }

    /// 构建邮件消息
    fn build_message(&self, msg: &EmailMessage) -> AppResult<Message> {
        let to = msg
            .to
            .parse::<Mailbox>()
            .map_err(|e| AppError::validation(format!("Invalid to address: {}", e)))?;

        let text_part = SinglePart::builder()
            .header(header::ContentType::TEXT_PLAIN)
            .body(msg.text_body.clone());

        let body = match &msg.html_body {
            Some(html) => MultiPart::alternative().singlepart(text_part).singlepart(
                SinglePart::builder()
                    .header(header::ContentType::TEXT_HTML)
                    .body(html.clone()),
            ),
            None => MultiPart::alternative().singlepart(text_part),
        };

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&msg.subject)
            .multipart(body)
            .map_err(|e| AppError::internal(format!("Failed to build message: {}", e)))
    }
}

#[async_trait::async_trait]
impl EmailSender for EmailClient {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        debug!(to = %message.to, subject = %message.subject, "Sending email");

        let email = self.build_message(&message)?;
        self.transport.send(email).await.map_err(|e| {
            warn!(to = %message.to, error = %e, "SMTP delivery failed");
            AppError::external_service(format!("Failed to send email: {}", e))
        })?;

        info!(to = %message.to, subject = %message.subject, "Email sent successfully");
        Ok(())
    }
}
