//! 货币值对象

use serde::{Deserialize, Serialize};
use shop_errors::{AppError, AppResult};
use std::fmt;

/// 货币代码（ISO 4217，三位大写字母）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> AppResult<Self> {
        let code = code.trim().to_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::validation(format!(
                "Invalid currency code: {}",
                code
            )));
        }
        Ok(Self(code))
    }

    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

impl TryFrom<String> for Currency {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 金额值对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// 金额（以最小单位存储，如分）
    pub amount: i64,
    /// 货币代码
    pub currency: Currency,
}

impl Money {
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    pub fn usd(amount: i64) -> Self {
        Self::new(amount, Currency::usd())
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// 相加，货币不同或溢出时返回错误
    pub fn checked_add(&self, other: &Money) -> AppResult<Money> {
        if self.currency != other.currency {
            return Err(AppError::validation(format!(
                "Cannot add {} to {}",
                other.currency, self.currency
            )));
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| AppError::validation("Money amount overflow"))?;
        Ok(Money::new(amount, self.currency.clone()))
    }

    /// 乘以数量
    pub fn times(&self, quantity: u32) -> AppResult<Money> {
        let amount = self
            .amount
            .checked_mul(i64::from(quantity))
            .ok_or_else(|| AppError::validation("Money amount overflow"))?;
        Ok(Money::new(amount, self.currency.clone()))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        write!(f, "{}{}.{:02} {}", sign, abs / 100, abs % 100, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_normalized() {
        assert_eq!(Currency::new("eur").unwrap().code(), "EUR");
        assert!(Currency::new("EURO").is_err());
        assert!(Currency::new("U5D").is_err());
    }

    #[test]
    fn test_add_same_currency() {
        let total = Money::usd(1050).checked_add(&Money::usd(250)).unwrap();
        assert_eq!(total, Money::usd(1300));
    }

    #[test]
    fn test_add_different_currency_fails() {
        let eur = Money::new(100, Currency::new("EUR").unwrap());
        assert!(Money::usd(100).checked_add(&eur).is_err());
    }

    #[test]
    fn test_times() {
        assert_eq!(Money::usd(199).times(3).unwrap(), Money::usd(597));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::usd(1999).to_string(), "19.99 USD");
        assert_eq!(Money::usd(-5).to_string(), "-0.05 USD");
    }

    #[test]
    fn test_deserialize_rejects_bad_currency() {
        let result: Result<Money, _> =
            serde_json::from_str(r#"{"amount": 100, "currency": "dollars"}"#);
        assert!(result.is_err());
    }
}
