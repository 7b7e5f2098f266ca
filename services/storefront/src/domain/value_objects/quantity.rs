//! 商品数量值对象

use serde::{Deserialize, Serialize};
use shop_errors::{AppError, AppResult};
use std::fmt;

/// 购物车内单个商品的数量，取值 1..=999
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 999;

    pub fn new(value: u32) -> AppResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(AppError::validation(format!(
                "Quantity must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// 合并数量，超过上限时返回错误
    pub fn checked_add(&self, other: Quantity) -> AppResult<Quantity> {
        Self::new(self.0 + other.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = AppError;

    fn try_from(value: u32) -> AppResult<Self> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Quantity::new(0).is_err());
        assert!(Quantity::new(1).is_ok());
        assert!(Quantity::new(999).is_ok());
        assert!(Quantity::new(1000).is_err());
    }

    #[test]
    fn test_checked_add_respects_max() {
        let a = Quantity::new(500).unwrap();
        assert_eq!(a.checked_add(Quantity::new(499).unwrap()).unwrap().value(), 999);
        assert!(a.checked_add(Quantity::new(500).unwrap()).is_err());
    }
}
