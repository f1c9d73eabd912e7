/// Raw webhook debugging feed
///
/// # Endpoints
///
/// - `GET /api/raw-events?limit` - Most recent unparsed webhook lines
///
/// When a conversation looks wrong on the dashboard, the raw feed shows
/// what WhatsApp actually sent before the bot parsed it.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Json,
};
use botboard_shared::models::raw_event::RawEvent;
use serde::{Deserialize, Serialize};

/// Default number of lines returned
const DEFAULT_LIMIT: i64 = 50;

/// Hard cap on the feed
const MAX_LIMIT: i64 = 500;

/// Query parameters for the raw-events feed
#[derive(Debug, Deserialize)]
pub struct RawEventsParams {
    pub limit: Option<i64>,
}

/// Response for `GET /api/raw-events`
#[derive(Debug, Serialize)]
pub struct RawEventsResponse {
    /// Effective limit after clamping
    pub limit: i64,

    /// Newest first
    pub events: Vec<RawEvent>,
}

/// Raw-events handler
pub async fn recent_raw_events(
    State(state): State<AppState>,
    Query(params): Query<RawEventsParams>,
) -> ApiResult<Json<RawEventsResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let events = RawEvent::list_recent(&state.db, limit).await?;

    Ok(Json(RawEventsResponse { limit, events }))
}
