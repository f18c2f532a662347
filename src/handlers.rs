use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::components::bridge::{BridgeError, LookupBridge};
use crate::components::calendar_feed::CalendarFeed;
use crate::components::shifts::{ShiftBuckets, ShiftEngine};
use crate::config::{Config, ShiftView};
use crate::error::BoardResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Where calendar snapshots come from
    pub feed: Arc<dyn CalendarFeed>,
    pub engine: Arc<ShiftEngine>,
    /// Runner for the ticket and asset lookup scripts
    pub bridge: Arc<LookupBridge>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub serial: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Fetch the feed and run one extraction pass
async fn compute_shifts(state: &AppState, now: DateTime<Utc>) -> BoardResult<ShiftBuckets> {
    let snapshot = state.feed.fetch_snapshot().await?;
    state.engine.extract(&snapshot, now)
}

async fn respond_with_shifts(state: &AppState, view: ShiftView) -> Response {
    // One reference time for the whole request
    let now = Utc::now();

    match compute_shifts(state, now).await {
        Ok(buckets) => {
            info!(
                "Serving {} shifts today, {} tomorrow",
                buckets.today.len(),
                buckets.tomorrow.len()
            );
            Json(buckets.into_payload(view)).into_response()
        }
        Err(e) => {
            error!("Calendar error: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch shifts")
        }
    }
}

/// Handler for today's and tomorrow's shifts, in the configured shape
pub async fn shifts_handler(State(state): State<AppState>) -> Response {
    let view = state.config.shift_view;
    respond_with_shifts(&state, view).await
}

/// Handler for today's shifts only
pub async fn today_shifts_handler(State(state): State<AppState>) -> Response {
    respond_with_shifts(&state, ShiftView::Today).await
}

/// Handler for asset lookups by serial number
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(serial) = params.serial.filter(|s| !s.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Serial required");
    };

    match state.bridge.search_asset(serial.trim()).await {
        Ok(value) => Json(value).into_response(),
        Err(err @ BridgeError::InvalidOutput { .. }) => {
            error!("Asset search returned garbage: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Invalid data from scanner")
        }
        Err(err) => {
            error!("Asset search failed: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Search failed")
        }
    }
}

/// Handler for the ticket list; degrades to an empty list
pub async fn tickets_handler(State(state): State<AppState>) -> Response {
    match state.bridge.list_tickets().await {
        Ok(value) => Json(value).into_response(),
        Err(err) => {
            error!("Ticket script failed: {}", err);
            Json(json!([])).into_response()
        }
    }
}

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
