//! Remote directory client for the community members endpoint.
//!
//! The full scan walks pages forward from page 1 and stops at the first page
//! with no records. There is no total-count check, so an empty page returned
//! mid-scan by a misbehaving upstream ends the scan early.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};

use crate::config::Config;
use crate::errors::{PickerError, PickerResult};
use crate::models::{Member, MembersPage};

/// Result of probing a community token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStatus {
    pub valid: bool,
    pub community_id: String,
}

impl TokenStatus {
    fn invalid() -> Self {
        Self {
            valid: false,
            community_id: String::new(),
        }
    }
}

/// HTTP client for the upstream community directory.
#[derive(Clone)]
pub struct DirectoryClient {
    http: Client,
    members_url: String,
    page_size: u32,
}

impl DirectoryClient {
    pub fn new(
        members_url: impl Into<String>,
        page_size: u32,
        timeout: Duration,
    ) -> PickerResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            members_url: members_url.into(),
            page_size,
        })
    }

    pub fn from_config(config: &Config) -> PickerResult<Self> {
        Self::new(
            config.upstream_url.clone(),
            config.page_size,
            config.request_timeout,
        )
    }

    /// Check whether `token` is accepted, returning the community it belongs to.
    ///
    /// Any non-200 answer means the token is invalid. Transport failures are errors.
    pub async fn probe_token(&self, token: &str) -> PickerResult<TokenStatus> {
        let response = self.get_page(token, 1, 1).await?;

        if response.status() != StatusCode::OK {
            tracing::info!(status = %response.status(), "Token probe rejected");
            return Ok(TokenStatus::invalid());
        }

        let page: MembersPage = response.json().await?;
        let community_id = page
            .records
            .first()
            .and_then(|record| record.community_id())
            .unwrap_or_default();

        Ok(TokenStatus {
            valid: true,
            community_id,
        })
    }

    /// Read every member of the community, page by page, in API order.
    pub async fn fetch_all_members(&self, token: &str) -> PickerResult<Vec<Member>> {
        let mut members = Vec::new();
        let mut page = 1;

        loop {
            let response = self.get_page(token, self.page_size, page).await?;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(PickerError::UpstreamStatus {
                    page,
                    status: status.as_u16(),
                });
            }

            let body: MembersPage = response.json().await?;
            if body.records.is_empty() {
                break;
            }

            tracing::debug!(page, records = body.records.len(), "Fetched member page");
            members.extend(body.records.into_iter().map(Member::from));
            page += 1;
        }

        tracing::info!(
            pages = page - 1,
            members = members.len(),
            "Finished member directory scan"
        );

        Ok(members)
    }

    async fn get_page(
        &self,
        token: &str,
        per_page: u32,
        page: u32,
    ) -> PickerResult<reqwest::Response> {
        let response = self
            .http
            .get(&self.members_url)
            .query(&[("per_page", per_page), ("page", page)])
            .header(header::AUTHORIZATION, format!("Token {}", token))
            .send()
            .await?;

        Ok(response)
    }
}
