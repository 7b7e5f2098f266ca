//! 内置邮件模板
//!
//! 配置了 `email.template_dir` 时，目录中的同名模板优先。

pub const VERIFICATION: &str = "verification";
pub const PASSWORD_RESET: &str = "password_reset";
pub const ORDER_CONFIRMATION: &str = "order_confirmation";
pub const PAYMENT_FAILED: &str = "payment_failed";

const VERIFICATION_TXT: &str = "Hello {{ first_name }},

Please verify your email address by opening the link below:

{{ link }}

This link will expire in {{ expires_in }}.

If you did not create an account, you can safely ignore this email.

The E-commerce Team
";

const VERIFICATION_HTML: &str = r#"<p>Hello {{ first_name }},</p>
<p>Please verify your email address by clicking the link below:</p>
<p><a href="{{ link }}">Verify email address</a></p>
<p>This link will expire in {{ expires_in }}.</p>
<p>If you did not create an account, you can safely ignore this email.</p>
<p>The E-commerce Team</p>
"#;

const PASSWORD_RESET_TXT: &str = "Hello {{ first_name }},

We received a request to reset your password. Open the link below to choose a new one:

{{ link }}

This link will expire in {{ expires_in }}.

If you did not request a password reset, you can safely ignore this email.

The E-commerce Team
";

const PASSWORD_RESET_HTML: &str = r#"<p>Hello {{ first_name }},</p>
<p>We received a request to reset your password. Click the link below to choose a new one:</p>
<p><a href="{{ link }}">Reset password</a></p>
<p>This link will expire in {{ expires_in }}.</p>
<p>If you did not request a password reset, you can safely ignore this email.</p>
<p>The E-commerce Team</p>
"#;

const ORDER_CONFIRMATION_TXT: &str = "Hello {{ first_name }},

Thank you for your order! Your payment was received and order #{{ order_id }} is confirmed.

Order total: {{ total }}

You can review your order at {{ link }}

The E-commerce Team
";

const ORDER_CONFIRMATION_HTML: &str = r#"<p>Hello {{ first_name }},</p>
<p>Thank you for your order! Your payment was received and order <strong>#{{ order_id }}</strong> is confirmed.</p>
<p>Order total: {{ total }}</p>
<p><a href="{{ link }}">View your order</a></p>
<p>The E-commerce Team</p>
"#;

const PAYMENT_FAILED_TXT: &str = "Hello {{ first_name }},

Unfortunately the payment for order #{{ order_id }} ({{ total }}) could not be completed.

Please update your payment details at {{ link }}

The E-commerce Team
";

const PAYMENT_FAILED_HTML: &str = r#"<p>Hello {{ first_name }},</p>
<p>Unfortunately the payment for order <strong>#{{ order_id }}</strong> ({{ total }}) could not be completed.</p>
<p><a href="{{ link }}">Update your payment details</a></p>
<p>The E-commerce Team</p>
"#;

/// 全部内置模板 `(name, content)`
pub fn builtin() -> [(String, &'static str); 8] {
    [
        (format!("{}.txt", VERIFICATION), VERIFICATION_TXT),
        (format!("{}.html", VERIFICATION), VERIFICATION_HTML),
        (format!("{}.txt", PASSWORD_RESET), PASSWORD_RESET_TXT),
        (format!("{}.html", PASSWORD_RESET), PASSWORD_RESET_HTML),
        (format!("{}.txt", ORDER_CONFIRMATION), ORDER_CONFIRMATION_TXT),
        (format!("{}.html", ORDER_CONFIRMATION), ORDER_CONFIRMATION_HTML),
        (format!("{}.txt", PAYMENT_FAILED), PAYMENT_FAILED_TXT),
        (format!("{}.html", PAYMENT_FAILED), PAYMENT_FAILED_HTML),
    ]
}
