/// Quick-metrics overview
///
/// # Endpoints
///
/// - `GET /api/overview` - Connectivity check plus the headline numbers the
///   dashboard's landing cards show

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use botboard_shared::{
    filters::DateRange,
    models::menu_event::{MenuEvent, TopService},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Headline metrics
#[derive(Debug, Serialize)]
pub struct OverviewMetrics {
    pub total_users: i64,
    pub active_conversations: i64,
    pub top_services: Vec<TopService>,
}

/// Response for `GET /api/overview`
#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub status: String,

    /// Database clock, so drift between bot and dashboard is visible
    pub server_time: DateTime<Utc>,

    pub metrics: OverviewMetrics,
}

/// Overview handler
pub async fn overview(State(state): State<AppState>) -> ApiResult<Json<OverviewResponse>> {
    let server_time: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()")
        .fetch_one(&state.db)
        .await?;

    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await?;

    let active_conversations: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM conversations WHERE status = 'active'")
            .fetch_one(&state.db)
            .await?;

    let top_services = MenuEvent::top_services(&state.db, &DateRange::default(), 5).await?;

    Ok(Json(OverviewResponse {
        status: "ok".to_string(),
        server_time,
        metrics: OverviewMetrics {
            total_users,
            active_conversations,
            top_services,
        },
    }))
}
