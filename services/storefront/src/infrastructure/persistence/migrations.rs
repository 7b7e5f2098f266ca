//! 数据库表结构

use shop_adapter_postgres::{Migration, MigrationManager};
use shop_errors::AppResult;
use sqlx::PgPool;
use tracing::info;

/// storefront 的全部迁移
pub fn migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "create_analytics_events",
            r#"
            CREATE TABLE IF NOT EXISTS analytics_events (
                id UUID PRIMARY KEY,
                event_type VARCHAR(64) NOT NULL,
                user_id VARCHAR(255),
                session_id VARCHAR(255),
                occurred_at TIMESTAMPTZ NOT NULL,
                payload JSONB NOT NULL DEFAULT '{}'::jsonb,
                user_agent TEXT,
                ip_address VARCHAR(64),
                referrer TEXT,
                CONSTRAINT analytics_events_subject CHECK (user_id IS NOT NULL OR session_id IS NOT NULL)
            );
            CREATE INDEX IF NOT EXISTS idx_analytics_events_user ON analytics_events (user_id, occurred_at DESC);
            CREATE INDEX IF NOT EXISTS idx_analytics_events_type ON analytics_events (event_type, occurred_at DESC);
            CREATE INDEX IF NOT EXISTS idx_analytics_events_occurred ON analytics_events (occurred_at DESC);
            "#,
        ),
        Migration::new(
            2,
            "create_carts",
            r#"
            CREATE TABLE IF NOT EXISTS carts (
                id UUID PRIMARY KEY,
                user_id BIGINT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
            CREATE TABLE IF NOT EXISTS cart_items (
                cart_id UUID NOT NULL REFERENCES carts (id) ON DELETE CASCADE,
                product_id BIGINT NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity > 0),
                unit_price BIGINT NOT NULL CHECK (unit_price >= 0),
                currency CHAR(3) NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (cart_id, product_id)
            );
            "#,
        ),
        Migration::new(
            3,
            "create_users_orders_payments",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                first_name VARCHAR(100) NOT NULL DEFAULT '',
                last_name VARCHAR(100) NOT NULL DEFAULT '',
                email_verified BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL
            );
            CREATE TABLE IF NOT EXISTS orders (
                id BIGINT PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users (id),
                status VARCHAR(32) NOT NULL,
                total_amount BIGINT NOT NULL,
                currency CHAR(3) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
            CREATE TABLE IF NOT EXISTS payments (
                id BIGINT PRIMARY KEY,
                order_id BIGINT NOT NULL REFERENCES orders (id),
                status VARCHAR(32) NOT NULL,
                amount BIGINT NOT NULL,
                currency CHAR(3) NOT NULL,
                transaction_id VARCHAR(255),
                failure_reason TEXT,
                processed_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_orders_user ON orders (user_id);
            CREATE INDEX IF NOT EXISTS idx_payments_order ON payments (order_id);
            "#,
        ),
        Migration::new(
            4,
            "create_processed_webhook_events",
            r#"
            CREATE TABLE IF NOT EXISTS processed_webhook_events (
                event_id VARCHAR(255) PRIMARY KEY,
                processed_at TIMESTAMPTZ NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_processed_webhook_events_at ON processed_webhook_events (processed_at);
            "#,
        ),
    ]
}

/// 应用待处理的迁移
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let result = MigrationManager::new(pool.clone())
        .migrate(&migrations())
        .await?
        .into_result()?;
    info!(
        applied = result.applied_count(),
        skipped = result.skipped.len(),
        "Database migrations completed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_versions_unique_and_ordered() {
        let migrations = migrations();
        let versions: Vec<i64> = migrations.iter().map(|m| m.version).collect();
        let unique: HashSet<i64> = versions.iter().copied().collect();
        assert_eq!(unique.len(), versions.len());
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
    }
}
