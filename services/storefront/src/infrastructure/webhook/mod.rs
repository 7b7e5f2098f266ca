//! 支付渠道 webhook 支持

mod signature;

pub use signature::{SIGNATURE_HEADER, SignatureError, StripeSignatureVerifier};
