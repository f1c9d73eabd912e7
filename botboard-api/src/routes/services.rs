/// Top-services report
///
/// # Endpoints
///
/// - `GET /api/services/top?from&to&limit` - Most-viewed services and their
///   booking conversion

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Json,
};
use botboard_shared::{
    filters::DateRange,
    models::menu_event::{MenuEvent, ServiceConversion, TopCategory, TopService},
};
use serde::{Deserialize, Serialize};

/// Default number of services returned
const DEFAULT_LIMIT: i64 = 10;

/// Hard cap on the services list
const MAX_LIMIT: i64 = 50;

fn effective_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Query parameters for the top-services report
#[derive(Debug, Deserialize)]
pub struct TopServicesParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
}

/// Filter echo including the effective limit
#[derive(Debug, Serialize)]
pub struct TopServicesFilters {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: i64,
}

/// Response for `GET /api/services/top`
#[derive(Debug, Serialize)]
pub struct TopServicesResponse {
    /// Most-viewed service options
    pub top_services: Vec<TopService>,

    /// Most-viewed category options (always top 10)
    pub top_categories: Vec<TopCategory>,

    /// Views vs. confirmed bookings per service (always top 10 by views)
    pub conversion_by_service: Vec<ServiceConversion>,

    pub filters: TopServicesFilters,
}

/// Top-services handler
///
/// # Errors
///
/// - `400 Bad Request`: Unparseable `from`/`to`
pub async fn top_services(
    State(state): State<AppState>,
    Query(params): Query<TopServicesParams>,
) -> ApiResult<Json<TopServicesResponse>> {
    let range = DateRange::parse(params.from.as_deref(), params.to.as_deref())?;
    let limit = effective_limit(params.limit);

    let (top_services, top_categories, conversion_by_service) = tokio::try_join!(
        MenuEvent::top_services(&state.db, &range, limit),
        MenuEvent::top_categories(&state.db, &range),
        MenuEvent::conversion_by_service(&state.db, &range),
    )?;

    Ok(Json(TopServicesResponse {
        top_services,
        top_categories,
        conversion_by_service,
        filters: TopServicesFilters {
            from: params.from,
            to: params.to,
            limit,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_clamping() {
        assert_eq!(effective_limit(None), 10);
        assert_eq!(effective_limit(Some(200)), 50);
        assert_eq!(effective_limit(Some(0)), 1);
        assert_eq!(effective_limit(Some(25)), 25);
    }
}
