use axum::{extract::State, response::IntoResponse, routing::get, Router};

use crate::handlers::common::success_response;
use crate::services::analytics::DashboardSummary;
use crate::{errors::ApiError, AppState};

/// Creates the router for analytics endpoints
pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/summary", get(dashboard_summary))
}

/// Admin dashboard figures: order counts, revenue, per-day buckets
#[utoipa::path(
    get,
    path = "/api/v1/analytics/summary",
    responses(
        (status = 200, description = "Summary computed", body = crate::ApiResponse<DashboardSummary>)
    ),
    tag = "Analytics"
)]
pub async fn dashboard_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.services.analytics.dashboard_summary().await?;
    Ok(success_response(summary))
}
