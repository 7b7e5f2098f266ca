//! 邮件通知

mod smtp_email_service;
mod templates;

pub use smtp_email_service::SmtpEmailService;
