//! Summary statistics endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::auth::Verified;
use crate::models::StatsReport;
use crate::AppState;

/// GET /api/stats - Recency tiers and monthly sign-up cohorts.
pub async fn get_stats(
    State(state): State<AppState>,
    Verified(token): Verified,
) -> ApiResult<StatsReport> {
    let report = state.picker.aggregate(&token).await?;
    success(report)
}
