//! Per-token cache of the materialized member directory.
//!
//! Entries expire lazily: age is checked on access and nothing refreshes in the
//! background. The lock is never held across the upstream fetch, so two requests
//! for the same uncached token may both fetch; the last write wins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::Member;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// An immutable snapshot of a community's members.
#[derive(Debug, Clone)]
pub struct Dataset {
    members: Arc<Vec<Member>>,
    built_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(members: Vec<Member>, built_at: DateTime<Utc>) -> Self {
        Self {
            members: Arc::new(members),
            built_at,
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}

/// Token-keyed dataset cache with a time-to-live.
pub struct DatasetCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, Dataset>>,
}

impl DatasetCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached dataset for `token`, or build, store and return a new one.
    ///
    /// A failed build leaves the cache untouched.
    pub async fn get_or_build<F, Fut, E>(&self, token: &str, build: F) -> Result<Dataset, E>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Vec<Member>, E>>,
    {
        if let Some(dataset) = self.get(token) {
            debug!(members = dataset.len(), built_at = %dataset.built_at(), "Dataset cache hit");
            return Ok(dataset);
        }

        info!("Dataset cache miss, fetching member directory");
        let members = build(token.to_string()).await?;
        let dataset = Dataset::new(members, self.clock.now());

        self.insert(token, dataset.clone());
        Ok(dataset)
    }

    /// Get a fresh dataset for `token`, if one is cached.
    pub fn get(&self, token: &str) -> Option<Dataset> {
        let entries = self.entries.read().ok()?;
        let dataset = entries.get(token)?;

        if !self.is_fresh(dataset, self.clock.now()) {
            debug!("Dataset cache entry expired");
            return None;
        }

        Some(dataset.clone())
    }

    /// Drop the dataset for `token`. Returns whether one was cached.
    pub fn invalidate(&self, token: &str) -> bool {
        match self.entries.write() {
            Ok(mut entries) => entries.remove(token).is_some(),
            Err(_) => false,
        }
    }

    /// Number of entries currently stored, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    fn insert(&self, token: &str, dataset: Dataset) {
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(_) => return, // Lock poisoned, skip caching
        };

        let now = self.clock.now();
        let before = entries.len();
        entries.retain(|_, existing| self.is_fresh(existing, now));
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, "Purged expired datasets");
        }

        entries.insert(token.to_string(), dataset);
    }

    fn is_fresh(&self, dataset: &Dataset, now: DateTime<Utc>) -> bool {
        // A build time in the future (clock skew) counts as fresh.
        (now - dataset.built_at())
            .to_std()
            .map(|age| age < self.ttl)
            .unwrap_or(true)
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock {
    now: std::sync::Mutex<DateTime<Utc>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: std::sync::Mutex::new(now),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
