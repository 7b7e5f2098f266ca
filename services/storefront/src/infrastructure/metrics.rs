//! Storefront Metrics
//!
//! 业务指标记录

use metrics::counter;

/// 记录 webhook 事件处理结果
pub fn record_webhook_event(event_type: &str, outcome: &str) {
    let labels = [
        ("event_type", event_type.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!("webhook_events_total", &labels).increment(1);
}

/// 记录已保存的分析事件
pub fn record_analytics_event_tracked(event_type: &str) {
    let labels = [("event_type", event_type.to_string())];
    counter!("analytics_events_tracked_total", &labels).increment(1);
}

/// 记录邮件发送
pub fn record_email_sent(kind: &str, success: bool) {
    let labels = [
        ("kind", kind.to_string()),
        ("result", if success { "sent" } else { "failed" }.to_string()),
    ];
    counter!("emails_sent_total", &labels).increment(1);
}
