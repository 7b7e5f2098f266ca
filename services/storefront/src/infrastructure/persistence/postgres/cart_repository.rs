//! PostgreSQL 购物车仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shop_common::UserId;
use shop_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::repositories::CartRepository;
use crate::domain::value_objects::{Currency, Money, Quantity};

#[derive(sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: i64,
    quantity: i32,
    unit_price: i64,
    currency: String,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = AppError;

    fn try_from(row: CartItemRow) -> AppResult<Self> {
        let corrupt = |e: AppError| AppError::database(format!("Corrupt cart item row: {}", e));
        let quantity = u32::try_from(row.quantity)
            .map_err(|_| AppError::database(format!("Negative quantity: {}", row.quantity)))
            .and_then(|q| Quantity::new(q).map_err(corrupt))?;
        let currency = Currency::new(&row.currency).map_err(corrupt)?;
        CartItem::new(row.product_id, quantity, Money::new(row.unit_price, currency))
            .map_err(corrupt)
    }
}

pub struct PostgresCartRepository {
    pool: PgPool,
}

impl PostgresCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, cart_id: Uuid) -> AppResult<Vec<CartItem>> {
        sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT product_id, quantity, unit_price, currency
            FROM cart_items
            WHERE cart_id = $1
            ORDER BY position
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load cart items: {}", e)))?
        .into_iter()
        .map(CartItem::try_from)
        .collect()
    }
}

#[async_trait]
impl CartRepository for PostgresCartRepository {
    async fn save(&self, cart: &Cart) -> AppResult<Cart> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {}", e)))?;

        // 同一用户并发保存时以已有行为准
        let row = sqlx::query_as::<_, CartRow>(
            r#"
            INSERT INTO carts (id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = EXCLUDED.updated_at
            RETURNING id, created_at, updated_at
            "#,
        )
        .bind(cart.id())
        .bind(cart.user_id().value())
        .bind(cart.created_at())
        .bind(cart.updated_at())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to save cart: {}", e)))?;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(row.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to replace cart items: {}", e)))?;

        for (position, item) in cart.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (cart_id, product_id, quantity, unit_price, currency, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(item.quantity.value() as i32)
            .bind(item.unit_price.amount)
            .bind(item.unit_price.currency.code())
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to save cart item: {}", e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit cart: {}", e)))?;

        Ok(Cart::restore(
            row.id,
            cart.user_id(),
            cart.items().to_vec(),
            row.created_at,
            row.updated_at,
        ))
    }

    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, created_at, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find cart: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let items = self.load_items(row.id).await?;
        Ok(Some(Cart::restore(
            row.id,
            user_id,
            items,
            row.created_at,
            row.updated_at,
        )))
    }

    async fn delete(&self, cart: &Cart) -> AppResult<()> {
        sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(cart.user_id().value())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete cart: {}", e)))?;

        Ok(())
    }
}
