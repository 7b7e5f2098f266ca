//! PostgreSQL 已处理 webhook 事件仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shop_errors::{AppError, AppResult};
use sqlx::PgPool;

use crate::domain::repositories::ProcessedEventRepository;
use crate::domain::webhook::ProcessedWebhookEvent;

pub struct PostgresProcessedEventRepository {
    pool: PgPool,
}

impl PostgresProcessedEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessedEventRepository for PostgresProcessedEventRepository {
    async fn try_claim(&self, event: &ProcessedWebhookEvent) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO processed_webhook_events (event_id, processed_at)
            VALUES ($1, $2)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&event.event_id)
        .bind(event.processed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to claim webhook event: {}", e)))?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, event_id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM processed_webhook_events WHERE event_id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to release webhook event: {}", e)))?;

        Ok(())
    }

    async fn exists(&self, event_id: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM processed_webhook_events WHERE event_id = $1)",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to check webhook event: {}", e)))
    }

    async fn cleanup_before(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM processed_webhook_events WHERE processed_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to clean up webhook events: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::migrations::run_migrations;
    use chrono::Duration;

    #[sqlx::test(migrations = false)]
    async fn test_claim_release_and_reclaim(pool: PgPool) {
        run_migrations(&pool).await.unwrap();
        let repo = PostgresProcessedEventRepository::new(pool);
        let event = ProcessedWebhookEvent::new("evt_1");

        assert!(!repo.exists("evt_1").await.unwrap());
        assert!(repo.try_claim(&event).await.unwrap());
        assert!(!repo.try_claim(&event).await.unwrap());
        assert!(repo.exists("evt_1").await.unwrap());

        repo.release("evt_1").await.unwrap();
        assert!(!repo.exists("evt_1").await.unwrap());
        assert!(repo.try_claim(&event).await.unwrap());
    }

    #[sqlx::test(migrations = false)]
    async fn test_cleanup_before_removes_only_old_events(pool: PgPool) {
        run_migrations(&pool).await.unwrap();
        let repo = PostgresProcessedEventRepository::new(pool);
        let now = Utc::now();

        let old = ProcessedWebhookEvent {
            event_id: "evt_old".to_string(),
            processed_at: now - Duration::days(10),
        };
        assert!(repo.try_claim(&old).await.unwrap());
        assert!(repo.try_claim(&ProcessedWebhookEvent::new("evt_new")).await.unwrap());

        let removed = repo.cleanup_before(now - Duration::days(1)).await.unwrap();
        assert_eq!(removed, 1);
        assert!(!repo.exists("evt_old").await.unwrap());
        assert!(repo.exists("evt_new").await.unwrap());
    }
}
