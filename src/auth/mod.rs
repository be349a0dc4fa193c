//! Community token extraction.
//!
//! Callers send the community admin token the same way the upstream API expects it:
//! `Authorization: Token <token>`. `Bearer <token>` is accepted as well.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::errors::AppError;
use crate::picker::VerifiedToken;
use crate::AppState;

/// Raw community token taken from the request headers. Not yet checked upstream.
#[derive(Debug, Clone)]
pub struct CommunityToken(pub String);

/// Community token the upstream API accepted for this request.
#[derive(Debug, Clone)]
pub struct Verified(pub VerifiedToken);

/// Pull the token out of an `Authorization` header value.
pub fn parse_authorization(value: &str) -> Option<&str> {
    let token = value
        .strip_prefix("Token ")
        .or_else(|| value.strip_prefix("Bearer "))?
        .trim();

    (!token.is_empty()).then_some(token)
}

fn token_from_headers(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_authorization)
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::Unauthorized(
                "Missing community token. Send it as 'Authorization: Token <token>'.".to_string(),
            )
        })
}

impl<S> FromRequestParts<S> for CommunityToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        token_from_headers(&parts.headers).map(CommunityToken)
    }
}

impl FromRequestParts<AppState> for Verified {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)?;
        let verified = state.picker.verify(&token).await?;
        Ok(Verified(verified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_scheme() {
        assert_eq!(parse_authorization("Token abc123"), Some("abc123"));
    }

    #[test]
    fn test_parse_bearer_scheme() {
        assert_eq!(parse_authorization("Bearer abc123"), Some("abc123"));
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert_eq!(parse_authorization("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_authorization("abc123"), None);
    }

    #[test]
    fn test_parse_rejects_empty_token() {
        assert_eq!(parse_authorization("Token "), None);
        assert_eq!(parse_authorization("Token    "), None);
    }

    #[test]
    fn test_missing_header_is_unauthorized() {
        let headers = HeaderMap::new();
        let err = token_from_headers(&headers).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
