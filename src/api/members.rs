//! Member API endpoints.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use super::{success, ApiResult, AppJson};
use crate::auth::Verified;
use crate::errors::AppError;
use crate::models::{FilterSpec, Member};
use crate::sampler::Odds;
use crate::AppState;

/// Request body for filtering the directory.
#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    #[serde(flatten)]
    pub filter: FilterSpec,
    /// How many members the caller intends to pick; used only to report odds.
    #[serde(default)]
    pub picks: Option<usize>,
}

/// Filtered members with the population size.
#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub members: Vec<Member>,
    pub population: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub odds: Option<Odds>,
}

/// Request body for a random pick.
#[derive(Debug, Deserialize)]
pub struct SampleRequest {
    #[serde(flatten)]
    pub filter: FilterSpec,
    pub count: usize,
}

/// Randomly picked members.
#[derive(Debug, Serialize)]
pub struct SampleResponse {
    pub picks: Vec<Member>,
    pub population: usize,
    pub odds: Odds,
}

/// Request body for an exact-name lookup.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Comma-separated list of names.
    pub names: String,
}

/// Members found by name plus the names nobody has.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub members: Vec<Member>,
    pub unknown_names: Vec<String>,
}

/// POST /api/members/filter - Filter the member directory.
pub async fn filter_members(
    State(state): State<AppState>,
    Verified(token): Verified,
    AppJson(request): AppJson<FilterRequest>,
) -> ApiResult<FilterResponse> {
    if request.picks == Some(0) {
        return Err(AppError::Validation("picks must be at least 1".to_string()));
    }

    let filtered = state
        .picker
        .fetch_and_filter(&token, &request.filter, request.picks)
        .await?;

    success(FilterResponse {
        members: filtered.members,
        population: filtered.population,
        odds: filtered.odds,
    })
}

/// POST /api/members/sample - Pick random members after filtering.
pub async fn sample_members(
    State(state): State<AppState>,
    Verified(token): Verified,
    AppJson(request): AppJson<SampleRequest>,
) -> ApiResult<SampleResponse> {
    let filtered = state
        .picker
        .fetch_and_filter(&token, &request.filter, Some(request.count))
        .await?;

    let picks = state.picker.sample(&filtered.members, request.count)?;

    success(SampleResponse {
        picks,
        population: filtered.population,
        odds: Odds::new(request.count, filtered.population),
    })
}

/// POST /api/members/search - Look members up by exact name.
pub async fn search_members(
    State(state): State<AppState>,
    Verified(token): Verified,
    AppJson(request): AppJson<SearchRequest>,
) -> ApiResult<SearchResponse> {
    if request.names.trim().is_empty() {
        return Err(AppError::Validation("At least one name is required".to_string()));
    }

    let matches = state.picker.search_names(&token, &request.names).await?;

    success(SearchResponse {
        members: matches.members,
        unknown_names: matches.unknown,
    })
}
