/// Menu funnel report
///
/// # Endpoints
///
/// - `GET /api/menu/funnel?from&to` - How users move through the bot's menus

use crate::{app::AppState, error::ApiResult, routes::RangeParams};
use axum::{
    extract::{Query, State},
    Json,
};
use botboard_shared::{
    filters::{DateRange, FilterEcho},
    models::menu_event::MenuFunnel,
};
use serde::Serialize;

/// Response for `GET /api/menu/funnel`
#[derive(Debug, Serialize)]
pub struct MenuFunnelResponse {
    #[serde(flatten)]
    pub funnel: MenuFunnel,

    /// Echo of the applied filters
    pub filters: FilterEcho,
}

/// Menu funnel handler
///
/// Shows where users spend time in the menu tree and where they drop off:
/// volume per level, per category, per action, the most-used options on the
/// first two levels, and how many conversations make it from the main menu
/// all the way to booking.
///
/// # Errors
///
/// - `400 Bad Request`: Unparseable `from`/`to`
pub async fn menu_funnel(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> ApiResult<Json<MenuFunnelResponse>> {
    let range = DateRange::parse(params.from.as_deref(), params.to.as_deref())?;

    let funnel = MenuFunnel::load(&state.db, &range).await?;

    Ok(Json(MenuFunnelResponse {
        funnel,
        filters: DateRange::echo(params.from.as_deref(), params.to.as_deref()),
    }))
}
