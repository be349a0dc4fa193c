//! Cache control endpoint.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::auth::Verified;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CacheResponse {
    pub cleared: bool,
}

/// DELETE /api/cache - Forget the cached directory so the next call refetches it.
pub async fn clear_cache(
    State(state): State<AppState>,
    Verified(token): Verified,
) -> ApiResult<CacheResponse> {
    let cleared = state.picker.forget(&token);
    tracing::info!(cleared, community_id = token.community_id(), "Cleared member cache");
    success(CacheResponse { cleared })
}
