//! 购物车聚合
//!
//! 每个用户至多一个购物车；同一购物车内所有商品使用同一种货币。

use chrono::{DateTime, Utc};
use serde::Serialize;
use shop_common::UserId;
use shop_errors::{AppError, AppResult};
use uuid::Uuid;

use super::value_objects::{Currency, Money, Quantity};

/// 商品 ID
pub type ProductId = i64;

/// 购物车条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl CartItem {
    pub fn new(product_id: ProductId, quantity: Quantity, unit_price: Money) -> AppResult<Self> {
        if unit_price.is_negative() {
            return Err(AppError::validation("Unit price must not be negative"));
        }
        Ok(Self {
            product_id,
            quantity,
            unit_price,
        })
    }

    /// 小计
    pub fn subtotal(&self) -> AppResult<Money> {
        self.unit_price.times(self.quantity.value())
    }
}

/// 购物车
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    id: Uuid,
    user_id: UserId,
    items: Vec<CartItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    /// 为用户创建空购物车
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: shop_common::new_id(),
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 从存储恢复
    pub fn restore(
        id: Uuid,
        user_id: UserId,
        items: Vec<CartItem>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            items,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// 购物车货币（空购物车为空）
    pub fn currency(&self) -> Option<&Currency> {
        self.items.first().map(|item| &item.unit_price.currency)
    }

    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// 添加商品，已存在时合并数量并使用最新单价
    ///
    /// 合计金额溢出时返回错误，购物车保持不变
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        quantity: Quantity,
        unit_price: Money,
    ) -> AppResult<()> {
        if unit_price.is_negative() {
            return Err(AppError::validation("Unit price must not be negative"));
        }
        if let Some(currency) = self.currency() {
            if *currency != unit_price.currency {
                return Err(AppError::validation(format!(
                    "Cart currency is {}, cannot add item priced in {}",
                    currency, unit_price.currency
                )));
            }
        }

        let mut items = self.items.clone();
        match items.iter_mut().find(|item| item.product_id == product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(quantity)?;
                existing.unit_price = unit_price;
            }
            None => items.push(CartItem::new(product_id, quantity, unit_price)?),
        }

        self.replace_items(items)
    }

    /// 设置商品数量
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: Quantity) -> AppResult<()> {
        let mut items = self.items.clone();
        let item = items
            .iter_mut()
            .find(|item| item.product_id == product_id)
            .ok_or_else(|| {
                AppError::not_found(format!("Product {} is not in the cart", product_id))
            })?;
        item.quantity = quantity;
        self.replace_items(items)
    }

    /// 移除商品
    pub fn remove_item(&mut self, product_id: ProductId) -> AppResult<CartItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id == product_id)
            .ok_or_else(|| {
                AppError::not_found(format!("Product {} is not in the cart", product_id))
            })?;
        let removed = self.items.remove(index);
        self.touch();
        Ok(removed)
    }

    /// 清空购物车
    pub fn clear(&mut self) {
        self.items.clear();
        self.touch();
    }

    /// 合计金额，空购物车为默认货币的零
    pub fn total(&self) -> AppResult<Money> {
        sum(&self.items)
    }

    /// 商品件数（数量之和）
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity.value()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 合计可计算时才替换条目
    fn replace_items(&mut self, items: Vec<CartItem>) -> AppResult<()> {
        sum(&items)?;
        self.items = items;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn sum(items: &[CartItem]) -> AppResult<Money> {
    let currency = items.first().map(|item| item.unit_price.currency.clone());
    let zero = Money::zero(currency.unwrap_or_default());
    items
        .iter()
        .try_fold(zero, |acc, item| acc.checked_add(&item.subtotal()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::new(UserId::new(42));
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total().unwrap(), Money::usd(0));
    }

    #[test]
    fn test_add_merges_quantities() {
        let mut cart = Cart::new(UserId::new(42));
        cart.add_item(1, qty(2), Money::usd(500)).unwrap();
        cart.add_item(1, qty(3), Money::usd(450)).unwrap();
        cart.add_item(2, qty(1), Money::usd(1000)).unwrap();

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item(1).unwrap().quantity.value(), 5);
        assert_eq!(cart.item(1).unwrap().unit_price, Money::usd(450));
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.total().unwrap(), Money::usd(3250));
    }

    #[test]
    fn test_merge_cannot_exceed_max_quantity() {
        let mut cart = Cart::new(UserId::new(42));
        cart.add_item(1, qty(999), Money::usd(1)).unwrap();
        assert!(cart.add_item(1, qty(1), Money::usd(1)).is_err());
        assert_eq!(cart.item(1).unwrap().quantity.value(), 999);
    }

    #[test]
    fn test_mixed_currency_rejected() {
        let mut cart = Cart::new(UserId::new(42));
        cart.add_item(1, qty(1), Money::usd(100)).unwrap();
        let eur = Money::new(100, Currency::new("EUR").unwrap());
        assert!(cart.add_item(2, qty(1), eur).is_err());
    }

    #[test]
    fn test_update_and_remove() {
        let mut cart = Cart::new(UserId::new(42));
        cart.add_item(1, qty(1), Money::usd(100)).unwrap();

        cart.update_quantity(1, qty(7)).unwrap();
        assert_eq!(cart.item_count(), 7);

        let err = cart.update_quantity(9, qty(1)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let removed = cart.remove_item(1).unwrap();
        assert_eq!(removed.product_id, 1);
        assert!(cart.is_empty());
        assert!(cart.remove_item(1).is_err());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new(UserId::new(42));
        cart.add_item(1, qty(1), Money::usd(100)).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.currency().is_none());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut cart = Cart::new(UserId::new(42));
        assert!(cart.add_item(1, qty(1), Money::usd(-1)).is_err());
    }

    #[test]
    fn test_negative_price_rejected_on_merge() {
        let mut cart = Cart::new(UserId::new(42));
        cart.add_item(1, qty(1), Money::usd(500)).unwrap();
        let err = cart.add_item(1, qty(1), Money::usd(-500)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(cart.item(1).unwrap().unit_price, Money::usd(500));
        assert_eq!(cart.item(1).unwrap().quantity.value(), 1);
    }

    #[test]
    fn test_total_overflow_leaves_cart_unchanged() {
        let mut cart = Cart::new(UserId::new(42));
        assert!(cart.add_item(1, qty(3), Money::usd(i64::MAX / 2)).is_err());
        assert!(cart.is_empty());

        cart.add_item(1, qty(1), Money::usd(i64::MAX / 2)).unwrap();
        let before = cart.clone();
        assert!(cart.add_item(2, qty(3), Money::usd(i64::MAX / 2)).is_err());
        assert!(cart.update_quantity(1, qty(3)).is_err());
        assert_eq!(cart, before);
        assert_eq!(cart.total().unwrap(), Money::usd(i64::MAX / 2));
    }
}
