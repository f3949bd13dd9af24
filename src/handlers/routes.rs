use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::ReferenceZone;
use crate::handlers::location_logger::LocationSink;
use crate::handlers::normalizer::normalize;
use crate::models::error::ApiError;
use crate::models::location_log::LogRecord;
use crate::models::raw_location::{LocationBatch, RawLocationItem};
use crate::models::responses::{BatchSummary, ItemResult};

#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn LocationSink>,
    pub zone: ReferenceZone,
}

impl AppState {
    pub fn new(sink: Arc<dyn LocationSink>, zone: ReferenceZone) -> Self {
        Self { sink, zone }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/locations", post(post_locations))
        .route("/api/logs/today", get(get_today_log))
        .route("/health", get(health))
        .with_state(state)
}

async fn post_locations(
    State(state): State<AppState>,
    payload: Result<Json<LocationBatch>, JsonRejection>,
) -> Result<Json<BatchSummary>, ApiError> {
    let Json(batch) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let items = match batch.locations {
        Some(items) if !items.is_empty() => items,
        _ => {
            let message = "locations is required and must not be empty".to_string();
            return Err(ApiError::BadRequest(message));
        }
    };

    let mut summary = BatchSummary::default();
    for entry in &items {
        let item = RawLocationItem::from_entry(entry);
        let alias = item.as_ref().map(RawLocationItem::alias_or_empty).unwrap_or_default();
        match item.and_then(|item| normalize(Some(&item), &state.zone)) {
            Ok(location) => {
                // A storage failure ends the whole batch; earlier lines stay.
                state.sink.append(LogRecord::new(location, Utc::now())).await?;
                summary.push(ItemResult::ok(alias));
            }
            Err(e) => {
                debug!("Rejected location for '{}': {}", alias, e);
                summary.push(ItemResult::error(alias, e.to_string()));
            }
        }
    }

    info!(
        "Location batch: received={} ok={} fail={}",
        summary.received, summary.ok, summary.fail
    );
    Ok(Json(summary))
}

async fn get_today_log(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.sink.read_today().await? {
        Some(text) => {
            let headers = [(header::CONTENT_TYPE, "text/plain; charset=utf-8")];
            Ok((headers, text).into_response())
        }
        None => Err(ApiError::NotFound("no locations logged today".to_string())),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
