//! 分析接口

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use shop_cqrs_core::{CommandHandler, QueryHandler};
use shop_errors::{AppError, AppResult};

use super::dto::{ListEventsParams, TrackEventRequest, TrackEventResponse, bad_request};
use crate::application::analytics::{
    GenerateReportQuery, GetUserActivityQuery, ListEventsQuery, TrackEventCommand,
};
use crate::container::AppState;
use crate::domain::analytics::{
    Event, EventFilter, Report, ReportParams, RequestContext, UserActivity,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/analytics/events", post(track_event).get(list_events))
        .route("/api/analytics/users/{user_id}/activity", get(user_activity))
        .route("/api/analytics/reports/{report_type}", get(generate_report))
}

fn header_value(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 从请求头提取客户端上下文
fn request_context(headers: &HeaderMap) -> RequestContext {
    let ip_address = header_value(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .or_else(|| header_value(headers, "x-real-ip"));

    RequestContext {
        user_agent: header_value(headers, header::USER_AGENT),
        ip_address,
        referrer: header_value(headers, header::REFERER),
    }
}

async fn track_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<TrackEventRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(request) = body.map_err(bad_request)?;

    let id = state
        .track_event
        .handle(TrackEventCommand {
            event_type: request.event_type,
            user_id: request.user_id,
            session_id: request.session_id,
            payload: request.payload,
            occurred_at: request.occurred_at,
            context: request_context(&headers),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TrackEventResponse { id })))
}

async fn list_events(
    State(state): State<AppState>,
    params: Result<Query<ListEventsParams>, QueryRejection>,
) -> AppResult<Json<Vec<Event>>> {
    let Query(params) = params.map_err(bad_request)?;
    let filter = EventFilter::try_from(params)?;

    let events = state
        .analytics_queries
        .handle(ListEventsQuery { filter })
        .await?;
    Ok(Json(events))
}

async fn user_activity(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserActivity>> {
    state
        .analytics_queries
        .handle(GetUserActivityQuery {
            user_id: user_id.clone(),
        })
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("No activity recorded for user {}", user_id)))
}

async fn generate_report(
    State(state): State<AppState>,
    Path(report_type): Path<String>,
    params: Result<Query<ReportParams>, QueryRejection>,
) -> AppResult<Json<Report>> {
    let Query(params) = params.map_err(bad_request)?;

    let report = state
        .analytics_queries
        .handle(GenerateReportQuery {
            report_type,
            params,
        })
        .await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_context_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert(header::REFERER, HeaderValue::from_static("https://shop.example.com/"));

        let context = request_context(&headers);
        assert_eq!(context.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(context.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(context.referrer.as_deref(), Some("https://shop.example.com/"));
    }

    #[test]
    fn test_request_context_empty() {
        assert_eq!(request_context(&HeaderMap::new()), RequestContext::default());
    }
}
