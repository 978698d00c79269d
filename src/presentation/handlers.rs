// HTTP request handlers
use crate::application::sensor_service::IngestOutcome;
use crate::infrastructure::http_response::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Deserialize)]
pub struct SampleQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub interval: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Store one reading. Noisy rows are dropped with 204 rather than rejected.
pub async fn ingest_reading(
    Path(series): Path<String>,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let spec = state.sensor_service.resolve(&series)?;
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    match state.sensor_service.ingest(spec, &payload).await? {
        IngestOutcome::Stored(id) => Ok((
            StatusCode::CREATED,
            Json(json!({ "id": id, "message": "Reading stored" })),
        )
            .into_response()),
        IngestOutcome::Discarded => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

/// Raw readings between `start_time` and `end_time`
pub async fn get_range(
    Path(series): Path<String>,
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let spec = state.sensor_service.resolve(&series)?;
    let readings = state
        .sensor_service
        .range(spec, query.start_time.as_deref(), query.end_time.as_deref())
        .await?;

    Ok(Json(json!({
        "data": state.presenter.rows(&readings, spec),
        "start_time": query.start_time,
        "end_time": query.end_time,
    })))
}

/// Raw readings for one civil day, optionally narrowed by time of day
pub async fn get_daily(
    Path(series): Path<String>,
    Query(query): Query<DailyQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let spec = state.sensor_service.resolve(&series)?;
    let daily = state
        .sensor_service
        .daily(
            spec,
            query.date.as_deref(),
            query.start_time.as_deref(),
            query.end_time.as_deref(),
        )
        .await?;

    Ok(Json(json!({
        "data": state.presenter.rows(&daily.readings, spec),
        "date": daily.date,
        "start_time": daily.start_time,
        "end_time": daily.end_time,
    })))
}

/// Most recent reading of a series
pub async fn get_latest(
    Path(series): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let spec = state.sensor_service.resolve(&series)?;
    let reading = state.sensor_service.latest(spec).await?;

    Ok(Json(json!({
        "data": state.presenter.row(&reading, spec),
        "table": spec.name,
    })))
}

/// Readings resampled onto a regular grid for charting
pub async fn get_sample(
    Path(series): Path<String>,
    Query(query): Query<SampleQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let spec = state.sensor_service.resolve(&series)?;
    let result = state
        .sensor_service
        .sample(
            spec,
            query.start_time.as_deref(),
            query.end_time.as_deref(),
            query.interval.as_deref(),
        )
        .await
        .map_err(ApiError::with_details)?;

    Ok(Json(state.presenter.sample_envelope(&result, spec)))
}
