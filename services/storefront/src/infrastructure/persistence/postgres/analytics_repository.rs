//! PostgreSQL 分析事件仓储
//!
//! 活动汇总与报表都在数据库端聚合，不把原始事件拉回内存。

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shop_errors::{AppError, AppResult};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::warn;
use uuid::Uuid;

use crate::domain::analytics::{
    ConversionFunnel, Event, EventFilter, EventSummary, EventType, Report, ReportData,
    ReportParams, ReportQuery, RequestContext, UserActivity, UserEngagement, UserEventCount,
};
use crate::domain::repositories::AnalyticsRepository;

const EVENT_COLUMNS: &str =
    "id, event_type, user_id, session_id, occurred_at, payload, user_agent, ip_address, referrer";

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    event_type: String,
    user_id: Option<String>,
    session_id: Option<String>,
    occurred_at: DateTime<Utc>,
    payload: Json<Value>,
    user_agent: Option<String>,
    ip_address: Option<String>,
    referrer: Option<String>,
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(row: EventRow) -> AppResult<Self> {
        let event_type = parse_event_type(&row.event_type)?;
        Ok(Event::restore(
            row.id,
            event_type,
            row.user_id,
            row.session_id,
            row.occurred_at,
            row.payload.0,
            RequestContext {
                user_agent: row.user_agent,
                ip_address: row.ip_address,
                referrer: row.referrer,
            },
        ))
    }
}

#[derive(sqlx::FromRow)]
struct TypeCountRow {
    event_type: String,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct ActivityCountRow {
    event_type: String,
    count: i64,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserCountRow {
    user_id: String,
    event_count: i64,
}

fn parse_event_type(raw: &str) -> AppResult<EventType> {
    raw.parse()
        .map_err(|_| AppError::database(format!("Unknown event type stored: {}", raw)))
}

fn type_counts(rows: Vec<TypeCountRow>) -> AppResult<BTreeMap<EventType, u64>> {
    rows.into_iter()
        .map(|row| Ok((parse_event_type(&row.event_type)?, row.count.max(0) as u64)))
        .collect()
}

pub struct PostgresAnalyticsRepository {
    pool: PgPool,
}

impl PostgresAnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn event_summary(
        &self,
        query: &ReportQuery,
        event_type: Option<EventType>,
    ) -> AppResult<ReportData> {
        let range = query.range();
        let rows = sqlx::query_as::<_, TypeCountRow>(
            r#"
            SELECT event_type, COUNT(*)::BIGINT AS count
            FROM analytics_events
            WHERE occurred_at >= $1 AND occurred_at < $2
              AND ($3::VARCHAR IS NULL OR event_type = $3)
            GROUP BY event_type
            "#,
        )
        .bind(range.start())
        .bind(range.end_exclusive())
        .bind(event_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to summarize events: {}", e)))?;

        Ok(ReportData::EventSummary(EventSummary::from_counts(
            type_counts(rows)?,
        )))
    }

    async fn user_engagement(&self, query: &ReportQuery, limit: usize) -> AppResult<ReportData> {
        let range = query.range();
        let active_users: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT user_id)::BIGINT
            FROM analytics_events
            WHERE occurred_at >= $1 AND occurred_at < $2 AND user_id IS NOT NULL
            "#,
        )
        .bind(range.start())
        .bind(range.end_exclusive())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count active users: {}", e)))?;

        let rows = sqlx::query_as::<_, UserCountRow>(
            r#"
            SELECT user_id, COUNT(*)::BIGINT AS event_count
            FROM analytics_events
            WHERE occurred_at >= $1 AND occurred_at < $2 AND user_id IS NOT NULL
            GROUP BY user_id
            ORDER BY event_count DESC, user_id ASC
            LIMIT $3
            "#,
        )
        .bind(range.start())
        .bind(range.end_exclusive())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to rank users: {}", e)))?;

        let counts = rows
            .into_iter()
            .map(|row| UserEventCount {
                user_id: row.user_id,
                event_count: row.event_count.max(0) as u64,
            })
            .collect();
        Ok(ReportData::UserEngagement(UserEngagement::new(
            active_users.max(0) as u64,
            counts,
            limit,
        )))
    }

    async fn conversion_funnel(&self, query: &ReportQuery) -> AppResult<ReportData> {
        let range = query.range();
        let steps: Vec<&str> = ConversionFunnel::STEPS.iter().map(|t| t.as_str()).collect();
        let rows = sqlx::query_as::<_, TypeCountRow>(
            r#"
            SELECT event_type, COUNT(DISTINCT user_id)::BIGINT AS count
            FROM analytics_events
            WHERE occurred_at >= $1 AND occurred_at < $2
              AND user_id IS NOT NULL
              AND event_type = ANY($3)
            GROUP BY event_type
            "#,
        )
        .bind(range.start())
        .bind(range.end_exclusive())
        .bind(steps)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to compute conversion funnel: {}", e)))?;

        let counts = type_counts(rows)?;
        let users = ConversionFunnel::STEPS.map(|t| counts.get(&t).copied().unwrap_or(0));
        Ok(ReportData::ConversionFunnel(ConversionFunnel::from_step_users(
            users,
        )))
    }
}

#[async_trait]
impl AnalyticsRepository for PostgresAnalyticsRepository {
    async fn save_event(&self, event: &Event) -> AppResult<()> {
        let context = event.context();
        sqlx::query(
            r#"
            INSERT INTO analytics_events (id, event_type, user_id, session_id, occurred_at,
                                          payload, user_agent, ip_address, referrer)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(event.id())
        .bind(event.event_type().as_str())
        .bind(event.user_id())
        .bind(event.session_id())
        .bind(event.occurred_at())
        .bind(Json(event.payload()))
        .bind(context.user_agent.as_deref())
        .bind(context.ip_address.as_deref())
        .bind(context.referrer.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(event_id = %event.id(), error = %e, "Failed to save analytics event");
            AppError::database(format!("Failed to save analytics event: {}", e))
        })?;

        Ok(())
    }

    async fn find_user_activity_by_user_id(
        &self,
        user_id: &str,
    ) -> AppResult<Option<UserActivity>> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::validation("user_id must not be empty"));
        }

        let rows = sqlx::query_as::<_, ActivityCountRow>(
            r#"
            SELECT event_type,
                   COUNT(*)::BIGINT AS count,
                   MIN(occurred_at) AS first_seen,
                   MAX(occurred_at) AS last_seen
            FROM analytics_events
            WHERE user_id = $1
            GROUP BY event_type
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load user activity: {}", e)))?;

        let (Some(first_seen_at), Some(last_seen_at)) = (
            rows.iter().map(|r| r.first_seen).min(),
            rows.iter().map(|r| r.last_seen).max(),
        ) else {
            return Ok(None);
        };

        let mut event_counts = BTreeMap::new();
        for row in &rows {
            event_counts.insert(parse_event_type(&row.event_type)?, row.count.max(0) as u64);
        }

        let recent = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM analytics_events WHERE user_id = $1 ORDER BY occurred_at DESC LIMIT $2",
            EVENT_COLUMNS
        ))
        .bind(user_id)
        .bind(UserActivity::RECENT_LIMIT as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to load recent events: {}", e)))?
        .into_iter()
        .map(Event::try_from)
        .collect::<AppResult<Vec<_>>>()?;

        Ok(UserActivity::from_parts(
            user_id,
            event_counts,
            first_seen_at,
            last_seen_at,
            recent,
        ))
    }

    async fn generate_report(
        &self,
        report_type: &str,
        params: &ReportParams,
    ) -> AppResult<Report> {
        let query = ReportQuery::parse(report_type, params)?;
        let data = match &query {
            ReportQuery::EventSummary { event_type, .. } => {
                self.event_summary(&query, *event_type).await?
            }
            ReportQuery::UserEngagement { limit, .. } => {
                self.user_engagement(&query, *limit).await?
            }
            ReportQuery::ConversionFunnel { .. } => self.conversion_funnel(&query).await?,
        };
        Ok(Report::new(&query, data))
    }

    async fn find_events(&self, filter: &EventFilter) -> AppResult<Vec<Event>> {
        filter.validate()?;

        sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {}
            FROM analytics_events
            WHERE ($1::VARCHAR IS NULL OR event_type = $1)
              AND ($2::VARCHAR IS NULL OR user_id = $2)
              AND ($3::TIMESTAMPTZ IS NULL OR occurred_at >= $3)
              AND ($4::TIMESTAMPTZ IS NULL OR occurred_at < $4)
            ORDER BY occurred_at DESC
            LIMIT $5
            "#,
            EVENT_COLUMNS
        ))
        .bind(filter.event_type.map(|t| t.as_str()))
        .bind(filter.user_id.as_deref())
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list events: {}", e)))?
        .into_iter()
        .map(Event::try_from)
        .collect()
    }
}
