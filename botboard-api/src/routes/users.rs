/// User summary report
///
/// # Endpoints
///
/// - `GET /api/users/summary?from&to` - Aggregate user metrics

use crate::{app::AppState, error::ApiResult, routes::RangeParams};
use axum::{
    extract::{Query, State},
    Json,
};
use botboard_shared::{
    filters::{DateRange, FilterEcho},
    models::user::UserSummary,
};
use serde::Serialize;

/// Response for `GET /api/users/summary`
#[derive(Debug, Serialize)]
pub struct UsersSummaryResponse {
    #[serde(flatten)]
    pub summary: UserSummary,

    /// Echo of the applied filters
    pub filters: FilterEcho,
}

/// User summary handler
///
/// Returns how many users exist, how many currently have an active
/// conversation, how many came back more than once, and the 10 most
/// recently seen: everything the dashboard's user cards show.
///
/// # Errors
///
/// - `400 Bad Request`: Unparseable `from`/`to`
pub async fn users_summary(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<UsersSummaryResponse>> {
    let range = DateRange::parse(params.from.as_deref(), params.to.as_deref())?;

    let summary = UserSummary::load(&state.db, &range).await?;

    Ok(Json(UsersSummaryResponse {
        summary,
        filters: DateRange::echo(params.from.as_deref(), params.to.as_deref()),
    }))
}
