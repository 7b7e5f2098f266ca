//! Stripe 风格的 webhook 签名校验
//!
//! 签名头格式 `t=<unix 秒>,v1=<hex>`，签名为 `HMAC-SHA256(secret, "{t}.{payload}")`。
//! 同一头部可以携带多个 `v1`（密钥轮换期间）。

use chrono::Utc;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// 签名头名称
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

const SCHEME: &str = "v1";

/// 签名校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Malformed signature header: {0}")]
    Malformed(String),

    #[error("No signature matches the expected signature for the payload")]
    NoValidSignature,

    #[error("Timestamp outside the tolerance zone ({0}s)")]
    TimestampOutsideTolerance(i64),
}

/// 签名校验器
pub struct StripeSignatureVerifier {
    secret: Secret<String>,
    tolerance_secs: i64,
}

impl StripeSignatureVerifier {
    pub fn new(secret: Secret<String>, tolerance_secs: i64) -> Self {
        Self {
            secret,
            tolerance_secs,
        }
    }

    fn mac(&self, timestamp: i64, payload: &str) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| SignatureError::Malformed(format!("invalid secret: {}", e)))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        Ok(mac)
    }

    /// 以给定时刻校验签名
    pub fn verify(&self, payload: &str, header: &str, now: i64) -> Result<(), SignatureError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => {
                    let t = value.parse::<i64>().map_err(|_| {
                        SignatureError::Malformed(format!("invalid timestamp '{}'", value))
                    })?;
                    timestamp = Some(t);
                }
                SCHEME => signatures.push(value),
                _ => {}
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| SignatureError::Malformed("missing timestamp".to_string()))?;
        if signatures.is_empty() {
            return Err(SignatureError::Malformed(format!(
                "no {} signatures found",
                SCHEME
            )));
        }

        let expected = self.mac(timestamp, payload)?;
        let matched = signatures.iter().any(|signature| {
            hex::decode(signature)
                .map(|bytes| expected.clone().verify_slice(&bytes).is_ok())
                .unwrap_or(false)
        });
        if !matched {
            return Err(SignatureError::NoValidSignature);
        }

        if self.tolerance_secs > 0 && now.abs_diff(timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(SignatureError::TimestampOutsideTolerance(self.tolerance_secs));
        }

        Ok(())
    }

    /// 以当前时刻校验签名
    pub fn verify_now(&self, payload: &str, header: &str) -> Result<(), SignatureError> {
        self.verify(payload, header, Utc::now().timestamp())
    }

    /// 生成签名头（测试与本地调试用）
    pub fn signature_header(
        &self,
        payload: &str,
        timestamp: i64,
    ) -> Result<String, SignatureError> {
        let signature = hex::encode(self.mac(timestamp, payload)?.finalize().into_bytes());
        Ok(format!("t={},{}={}", timestamp, SCHEME, signature))
    }
}
