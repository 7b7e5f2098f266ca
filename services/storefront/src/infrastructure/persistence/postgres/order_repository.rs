//! PostgreSQL 订单仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shop_common::UserId;
use shop_errors::{AppError, AppResult};
use sqlx::{PgExecutor, PgPool};

use crate::domain::order::{Order, OrderId};
use crate::domain::repositories::OrderRepository;
use crate::domain::value_objects::{Currency, Money};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    status: String,
    total_amount: i64,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = AppError;

    fn try_from(row: OrderRow) -> AppResult<Self> {
        Ok(Order {
            id: row.id,
            user_id: UserId::new(row.user_id),
            status: row.status.parse()?,
            total: Money::new(row.total_amount, Currency::new(&row.currency)?),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// 订单 upsert，可在事务内执行
pub(super) async fn upsert_order<'e>(
    executor: impl PgExecutor<'e>,
    order: &Order,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO orders (id, user_id, status, total_amount, currency, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO UPDATE SET
            status = EXCLUDED.status,
            total_amount = EXCLUDED.total_amount,
            currency = EXCLUDED.currency,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(order.id)
    .bind(order.user_id.value())
    .bind(order.status.as_str())
    .bind(order.total.amount)
    .bind(order.total.currency.code())
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to save order: {}", e)))?;

    Ok(())
}

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn find_by_id(&self, id: OrderId) -> AppResult<Option<Order>> {
        sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, status, total_amount, currency, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find order: {}", e)))?
        .map(Order::try_from)
        .transpose()
    }

    async fn save(&self, order: &Order) -> AppResult<()> {
        upsert_order(&self.pool, order).await
    }
}
