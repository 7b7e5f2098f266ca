//! 购物车命令

use shop_common::UserId;
use shop_cqrs_core::Command;

use crate::domain::cart::{Cart, ProductId};

/// 加入商品
#[derive(Debug, Clone)]
pub struct AddCartItemCommand {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// 单价（最小货币单位）
    pub unit_price: i64,
    /// 缺省为 USD
    pub currency: Option<String>,
}

impl Command for AddCartItemCommand {
    type Result = Cart;
}

/// 设置商品数量
#[derive(Debug, Clone)]
pub struct UpdateCartItemCommand {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl Command for UpdateCartItemCommand {
    type Result = Cart;
}

/// 移除商品
#[derive(Debug, Clone)]
pub struct RemoveCartItemCommand {
    pub user_id: UserId,
    pub product_id: ProductId,
}

impl Command for RemoveCartItemCommand {
    type Result = Cart;
}

/// 清空（删除）购物车
#[derive(Debug, Clone)]
pub struct ClearCartCommand {
    pub user_id: UserId,
}

impl Command for ClearCartCommand {
    type Result = ();
}
