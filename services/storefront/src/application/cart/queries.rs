//! 购物车查询

use shop_common::UserId;
use shop_cqrs_core::Query;

use crate::domain::cart::Cart;

#[derive(Debug, Clone)]
pub struct GetCartQuery {
    pub user_id: UserId,
}

impl Query for GetCartQuery {
    type Result = Option<Cart>;
}
