// Router - routes, store guard and HTTP middleware
use crate::infrastructure::http_response::ApiError;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_daily, get_latest, get_range, get_sample, health_check, ingest_reading,
};
use axum::{
    Router,
    extract::{Request, State},
    http::{Method, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Answers 503 before any handler runs while the store is down.
pub async fn require_store(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.sensor_service.store_available().await {
        tracing::warn!("Rejecting {} {}: store unavailable", request.method(), request.uri());
        return ApiError::unavailable().into_response();
    }
    next.run(request).await
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/:series", get(get_range).post(ingest_reading))
        .route("/api/:series/latest", get(get_latest))
        .route("/api/:series/sample", get(get_sample))
        .route("/api/daily/:series", get(get_daily))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_store));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/healthz", get(health_check))
        .merge(api)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
