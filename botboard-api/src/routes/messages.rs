/// Peak-hours report
///
/// # Endpoints
///
/// - `GET /api/messages/peak-hours?from&to` - Message volume by hour of day,
///   day of week, and day, plus overall totals

use crate::{app::AppState, error::ApiResult, routes::RangeParams};
use axum::{
    extract::{Query, State},
    Json,
};
use botboard_shared::{
    filters::{DateRange, FilterEcho},
    models::message::{
        self, DailyMessages, DayOfWeekMessages, HourlyMessages, Message, MessageTotals,
    },
};
use serde::Serialize;

/// Response for `GET /api/messages/peak-hours`
#[derive(Debug, Serialize)]
pub struct PeakHoursResponse {
    /// Volume per hour of day (0-23); silent hours are absent
    pub by_hour: Vec<HourlyMessages>,

    /// Volume per day of week (0=Sunday)
    pub by_day_of_week: Vec<DayOfWeekMessages>,

    /// Volume per day over the trailing 30 days
    pub by_day_last_30: Vec<DailyMessages>,

    /// The busiest hour, None when the range has no messages
    pub peak_hour: Option<HourlyMessages>,

    /// Overall totals for the range
    pub stats: MessageTotals,

    /// Echo of the applied filters
    pub filters: FilterEcho,
}

/// Peak-hours handler
///
/// The four aggregates are independent queries, so they run concurrently
/// against the pool; the peak hour itself is picked from the hourly rows in
/// process.
///
/// # Errors
///
/// - `400 Bad Request`: Unparseable `from`/`to`
pub async fn peak_hours(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<PeakHoursResponse>> {
    let range = DateRange::parse(params.from.as_deref(), params.to.as_deref())?;

    let (by_hour, by_day_of_week, by_day_last_30, stats) = tokio::try_join!(
        Message::by_hour(&state.db, &range),
        Message::by_day_of_week(&state.db, &range),
        Message::by_day_last_30(&state.db, &range),
        Message::totals(&state.db, &range),
    )?;

    let peak_hour = message::peak_hour(&by_hour);

    Ok(Json(PeakHoursResponse {
        by_hour,
        by_day_of_week,
        by_day_last_30,
        peak_hour,
        stats,
        filters: DateRange::echo(params.from.as_deref(), params.to.as_deref()),
    }))
}
