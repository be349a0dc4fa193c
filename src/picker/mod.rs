//! Operations offered to the presentation layer.
//!
//! Every dataset operation takes a [`VerifiedToken`], which can only be obtained
//! from a successful probe, so a rejected token never reaches the directory scan.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Clock, Dataset, DatasetCache};
use crate::client::{DirectoryClient, TokenStatus};
use crate::errors::{PickerError, PickerResult};
use crate::filters::{FilterPipeline, NameMatches, NameQuery};
use crate::models::{FilterSpec, Member, StatsReport};
use crate::sampler::{self, Odds};
use crate::stats;

/// A community token the upstream API accepted.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    token: String,
    community_id: String,
}

impl VerifiedToken {
    pub fn community_id(&self) -> &str {
        &self.community_id
    }

    fn as_str(&self) -> &str {
        &self.token
    }
}

/// Members left after filtering.
#[derive(Debug, Clone)]
pub struct FilteredMembers {
    pub members: Vec<Member>,
    pub population: usize,
    /// Present when the caller said how many members it intends to pick.
    pub odds: Option<Odds>,
}

/// Member directory access, filtering, sampling and statistics.
pub struct Picker {
    client: DirectoryClient,
    cache: DatasetCache,
    clock: Arc<dyn Clock>,
}

impl Picker {
    pub fn new(client: DirectoryClient, cache_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            cache: DatasetCache::new(cache_ttl, clock.clone()),
            clock,
        }
    }

    /// Ask the upstream API whether `token` is valid. Never touches the cache.
    pub async fn probe_token(&self, token: &str) -> PickerResult<TokenStatus> {
        self.client.probe_token(token).await
    }

    /// Probe `token` and fail with `AuthInvalid` if the upstream rejects it.
    pub async fn verify(&self, token: &str) -> PickerResult<VerifiedToken> {
        let status = self.probe_token(token).await?;
        if !status.valid {
            return Err(PickerError::AuthInvalid);
        }

        Ok(VerifiedToken {
            token: token.to_string(),
            community_id: status.community_id,
        })
    }

    /// The full member directory, served from the cache while it is fresh.
    pub async fn dataset(&self, token: &VerifiedToken) -> PickerResult<Dataset> {
        let client = &self.client;
        let dataset = self
            .cache
            .get_or_build(token.as_str(), move |token| async move {
                client.fetch_all_members(&token).await
            })
            .await?;

        if dataset.is_empty() {
            tracing::warn!(
                community_id = token.community_id(),
                "Member directory is empty"
            );
        }

        Ok(dataset)
    }

    /// Fetch the directory and narrow it with `spec`.
    pub async fn fetch_and_filter(
        &self,
        token: &VerifiedToken,
        spec: &FilterSpec,
        picks: Option<usize>,
    ) -> PickerResult<FilteredMembers> {
        let dataset = self.dataset(token).await?;
        let pipeline = FilterPipeline::from_spec(spec, self.clock.now());

        tracing::debug!(
            count = pipeline.len(),
            filters = ?pipeline.descriptions(),
            "Filtering member directory"
        );
        let members = pipeline.apply(dataset.members());
        let population = members.len();

        Ok(FilteredMembers {
            members,
            population,
            odds: picks.map(|count| Odds::new(count, population)),
        })
    }

    /// Pick `count` members uniformly at random from an already filtered set.
    pub fn sample(&self, members: &[Member], count: usize) -> PickerResult<Vec<Member>> {
        let mut rng = rand::thread_rng();
        sampler::sample(members, count, &mut rng)
    }

    /// Recency tiers and monthly creation cohorts over the whole directory.
    pub async fn aggregate(&self, token: &VerifiedToken) -> PickerResult<StatsReport> {
        let dataset = self.dataset(token).await?;
        Ok(stats::stats_report(dataset.members(), self.clock.now()))
    }

    /// Look members up by exact name from a comma-separated list.
    pub async fn search_names(
        &self,
        token: &VerifiedToken,
        names: &str,
    ) -> PickerResult<NameMatches> {
        let query = NameQuery::parse(names);
        if query.is_empty() {
            return Ok(NameMatches::default());
        }

        tracing::debug!(names = ?query.names(), "Searching members by name");
        let dataset = self.dataset(token).await?;
        let matches = query.apply(dataset.members());

        if !matches.unknown.is_empty() {
            tracing::warn!(unknown = ?matches.unknown, "Some requested names were not found");
        }

        Ok(matches)
    }

    /// Drop the cached directory for `token`. Returns whether one was cached.
    pub fn forget(&self, token: &VerifiedToken) -> bool {
        let cleared = self.cache.invalidate(token.as_str());
        tracing::debug!(remaining = self.cache.len(), "Dataset cache entries after clear");
        cleared
    }
}
