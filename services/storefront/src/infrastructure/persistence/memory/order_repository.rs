//! 内存订单、支付与用户仓储

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use shop_common::UserId;
use shop_errors::AppResult;
use tokio::sync::RwLock;

use crate::domain::order::{Order, OrderId};
use crate::domain::payment::{Payment, PaymentId};
use crate::domain::repositories::{OrderRepository, PaymentRepository, UserRepository};
use crate::domain::user::User;

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn save(&self, order: &Order) -> AppResult<()> {
        self.orders.write().await.insert(order.id, order.clone());
        Ok(())
    }
}

/// 与订单仓储共享存储，`save_with_order` 在同时持有两把写锁时写入
pub struct InMemoryPaymentRepository {
    payments: RwLock<HashMap<PaymentId, Payment>>,
    orders: Arc<InMemoryOrderRepository>,
}

impl InMemoryPaymentRepository {
    pub fn new(orders: Arc<InMemoryOrderRepository>) -> Self {
        Self {
            payments: RwLock::new(HashMap::new()),
            orders,
        }
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn find_by_id(&self, id: PaymentId) -> AppResult<Option<Payment>> {
        Ok(self.payments.read().await.get(&id).cloned())
    }

    async fn save(&self, payment: &Payment) -> AppResult<()> {
        self.payments.write().await.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn save_with_order(&self, payment: &Payment, order: &Order) -> AppResult<()> {
        let mut payments = self.payments.write().await;
        let mut orders = self.orders.orders.write().await;
        payments.insert(payment.id, payment.clone());
        orders.insert(order.id, order.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        self.users.write().await.insert(user.id, user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::domain::payment::PaymentStatus;
    use crate::domain::value_objects::Money;
    use chrono::Utc;

    #[tokio::test]
    async fn test_save_with_order_writes_both() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let payments = InMemoryPaymentRepository::new(orders.clone());

        let mut order = Order::new(1, UserId::new(7), Money::usd(2500));
        let mut payment = Payment::new(10, 1, Money::usd(2500));
        orders.save(&order).await.unwrap();
        payments.save(&payment).await.unwrap();

        payment.complete("pi_1", Utc::now()).unwrap();
        order.confirm().unwrap();
        payments.save_with_order(&payment, &order).await.unwrap();

        let stored_payment = payments.find_by_id(10).await.unwrap().unwrap();
        let stored_order = orders.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(stored_payment.status, PaymentStatus::Completed);
        assert_eq!(stored_order.status, OrderStatus::Confirmed);
    }
}
