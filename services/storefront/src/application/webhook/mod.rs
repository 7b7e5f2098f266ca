//! 支付 webhook 用例

mod cleanup;
mod processor;
mod use_case;

pub use cleanup::ProcessedEventCleanupTask;
pub use processor::PaymentWebhookProcessor;
pub use use_case::*;
