//! PostgreSQL 支付仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shop_errors::{AppError, AppResult};
use sqlx::{PgExecutor, PgPool};

use super::order_repository::upsert_order;
use crate::domain::order::Order;
use crate::domain::payment::{Payment, PaymentId};
use crate::domain::repositories::PaymentRepository;
use crate::domain::value_objects::{Currency, Money};

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    order_id: i64,
    status: String,
    amount: i64,
    currency: String,
    transaction_id: Option<String>,
    failure_reason: Option<String>,
    processed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(row: PaymentRow) -> AppResult<Self> {
        Ok(Payment {
            id: row.id,
            order_id: row.order_id,
            status: row.status.parse()?,
            amount: Money::new(row.amount, Currency::new(&row.currency)?),
            transaction_id: row.transaction_id,
            failure_reason: row.failure_reason,
            processed_at: row.processed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

async fn upsert_payment<'e>(executor: impl PgExecutor<'e>, payment: &Payment) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (id, order_id, status, amount, currency, transaction_id,
                              failure_reason, processed_at, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id) DO UPDATE SET
            status = EXCLUDED.status,
            transaction_id = EXCLUDED.transaction_id,
            failure_reason = EXCLUDED.failure_reason,
            processed_at = EXCLUDED.processed_at,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(payment.id)
    .bind(payment.order_id)
    .bind(payment.status.as_str())
    .bind(payment.amount.amount)
    .bind(payment.amount.currency.code())
    .bind(payment.transaction_id.as_deref())
    .bind(payment.failure_reason.as_deref())
    .bind(payment.processed_at)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to save payment: {}", e)))?;

    Ok(())
}

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn find_by_id(&self, id: PaymentId) -> AppResult<Option<Payment>> {
        sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, order_id, status, amount, currency, transaction_id, failure_reason,
                   processed_at, created_at, updated_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find payment: {}", e)))?
        .map(Payment::try_from)
        .transpose()
    }

    async fn save(&self, payment: &Payment) -> AppResult<()> {
        upsert_payment(&self.pool, payment).await
    }

    async fn save_with_order(&self, payment: &Payment, order: &Order) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        upsert_payment(&mut *tx, payment).await?;
        upsert_order(&mut *tx, order).await?;

        tx.commit().await.map_err(|e| {
            AppError::database(format!("Failed to commit payment and order: {}", e))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::domain::payment::PaymentStatus;
    use crate::domain::repositories::{OrderRepository, UserRepository};
    use crate::domain::user::User;
    use crate::domain::value_objects::Email;
    use crate::infrastructure::persistence::migrations::run_migrations;
    use crate::infrastructure::persistence::postgres::{
        PostgresOrderRepository, PostgresUserRepository,
    };
    use shop_common::UserId;

    async fn seed(pool: &PgPool) -> (Payment, Order) {
        run_migrations(pool).await.unwrap();
        let user = User::new(
            UserId::new(7),
            Email::new("ada@example.com").unwrap(),
            "Ada",
            "Lovelace",
        );
        PostgresUserRepository::new(pool.clone())
            .save(&user)
            .await
            .unwrap();
        let order = Order::new(1, UserId::new(7), Money::usd(2500));
        PostgresOrderRepository::new(pool.clone())
            .save(&order)
            .await
            .unwrap();
        let payment = Payment::new(10, 1, Money::usd(2500));
        PostgresPaymentRepository::new(pool.clone())
            .save(&payment)
            .await
            .unwrap();
        (payment, order)
    }

    #[sqlx::test(migrations = false)]
    async fn test_save_with_order_persists_both(pool: PgPool) {
        let (mut payment, mut order) = seed(&pool).await;
        let payments = PostgresPaymentRepository::new(pool.clone());
        let orders = PostgresOrderRepository::new(pool.clone());

        payment.complete("pi_123", Utc::now()).unwrap();
        order.confirm().unwrap();
        payments.save_with_order(&payment, &order).await.unwrap();

        let found = payments.find_by_id(10).await.unwrap().unwrap();
        assert_eq!(found.status, PaymentStatus::Completed);
        assert_eq!(found.transaction_id.as_deref(), Some("pi_123"));
        let found = orders.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(found.status, OrderStatus::Confirmed);
    }

    #[sqlx::test(migrations = false)]
    async fn test_save_with_order_rolls_back_payment_on_order_failure(pool: PgPool) {
        let (mut payment, _) = seed(&pool).await;
        let payments = PostgresPaymentRepository::new(pool.clone());

        payment.complete("pi_123", Utc::now()).unwrap();
        // 用户不存在，订单写入违反外键
        let orphan = Order::new(2, UserId::new(99), Money::usd(100));
        assert!(payments.save_with_order(&payment, &orphan).await.is_err());

        let found = payments.find_by_id(10).await.unwrap().unwrap();
        assert_eq!(found.status, PaymentStatus::Pending);
        assert!(found.transaction_id.is_none());
    }
}
