//! 内存购物车仓储

use std::collections::HashMap;

use async_trait::async_trait;
use shop_common::UserId;
use shop_errors::AppResult;
use tokio::sync::RwLock;

use crate::domain::cart::Cart;
use crate::domain::repositories::CartRepository;

#[derive(Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<HashMap<UserId, Cart>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn save(&self, cart: &Cart) -> AppResult<Cart> {
        let mut carts = self.carts.write().await;
        let persisted = match carts.get(&cart.user_id()) {
            Some(existing) => Cart::restore(
                existing.id(),
                cart.user_id(),
                cart.items().to_vec(),
                existing.created_at(),
                cart.updated_at(),
            ),
            None => cart.clone(),
        };
        carts.insert(cart.user_id(), persisted.clone());
        Ok(persisted)
    }

    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Option<Cart>> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn delete(&self, cart: &Cart) -> AppResult<()> {
        self.carts.write().await.remove(&cart.user_id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Money, Quantity};

    #[tokio::test]
    async fn test_save_is_idempotent_per_user() {
        let repo = InMemoryCartRepository::new();
        let mut cart = Cart::new(UserId::new(1));
        cart.add_item(10, Quantity::new(2).unwrap(), Money::usd(100)).unwrap();

        let first = repo.save(&cart).await.unwrap();
        let second = repo.save(&cart).await.unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(second.items().len(), 1);
    }

    #[tokio::test]
    async fn test_second_cart_keeps_original_identity() {
        let repo = InMemoryCartRepository::new();
        let original = repo.save(&Cart::new(UserId::new(1))).await.unwrap();

        let mut replacement = Cart::new(UserId::new(1));
        replacement
            .add_item(10, Quantity::new(1).unwrap(), Money::usd(100))
            .unwrap();
        let persisted = repo.save(&replacement).await.unwrap();

        assert_eq!(persisted.id(), original.id());
        assert_eq!(persisted.created_at(), original.created_at());
        assert_eq!(persisted.item_count(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_absent() {
        let repo = InMemoryCartRepository::new();
        let cart = repo.save(&Cart::new(UserId::new(1))).await.unwrap();

        repo.delete(&cart).await.unwrap();
        assert!(repo.find_by_user_id(UserId::new(1)).await.unwrap().is_none());
        // 再次删除不报错
        repo.delete(&cart).await.unwrap();
    }
}
