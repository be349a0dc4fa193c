//! Token probe endpoint.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::auth::CommunityToken;
use crate::AppState;

/// Outcome of a token probe.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub valid: bool,
    pub community_id: String,
}

/// GET /api/token - Check whether the community token is accepted upstream.
///
/// A rejected token is a normal answer (`valid: false`), not an error.
pub async fn probe_token(
    State(state): State<AppState>,
    CommunityToken(token): CommunityToken,
) -> ApiResult<TokenResponse> {
    let status = state.picker.probe_token(&token).await?;

    success(TokenResponse {
        valid: status.valid,
        community_id: status.community_id,
    })
}
