//! 路由组装

use axum::Router;
use axum::extract::{MatchedPath, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use shop_bootstrap::RequestTimer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::{analytics, carts, health, webhook};
use crate::container::AppState;

/// 请求体上限
const MAX_BODY_BYTES: usize = 256 * 1024;

/// 记录请求数与耗时，路由按匹配模板聚合
async fn track_metrics(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let timer = RequestTimer::new(req.method().as_str(), route);

    let response = next.run(req).await;
    timer.finish(response.status().as_u16());
    response
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(webhook::routes())
        .merge(analytics::routes())
        .merge(carts::routes())
        .route_layer(middleware::from_fn(track_metrics))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
