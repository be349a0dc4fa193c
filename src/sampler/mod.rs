//! Uniform random sampling of members without replacement.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::errors::{PickerError, PickerResult};
use crate::models::Member;

/// Chance of any single member in the population being picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Odds {
    pub picks: usize,
    pub population: usize,
}

impl Odds {
    pub fn new(picks: usize, population: usize) -> Self {
        Self { picks, population }
    }

    /// `picks / population * 100`, or `None` for an empty population.
    pub fn percent(&self) -> Option<f64> {
        if self.population == 0 {
            return None;
        }
        Some(self.picks as f64 / self.population as f64 * 100.0)
    }

    /// Percentage with three decimals, e.g. `"0.500"`.
    pub fn formatted_percent(&self) -> Option<String> {
        self.percent().map(|p| format!("{:.3}", p))
    }
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.formatted_percent() {
            Some(percent) => write!(f, "{}/{}, or {}%", self.picks, self.population, percent),
            None => write!(f, "{}/{}", self.picks, self.population),
        }
    }
}

impl Serialize for Odds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Odds", 3)?;
        state.serialize_field("picks", &self.picks)?;
        state.serialize_field("population", &self.population)?;
        state.serialize_field("percent", &self.formatted_percent())?;
        state.end()
    }
}

/// Draw `count` distinct members uniformly at random.
///
/// Fails with `SampleSizeExceeded` when fewer than `count` members are
/// available; the result is never silently shortened.
pub fn sample<R: Rng + ?Sized>(
    members: &[Member],
    count: usize,
    rng: &mut R,
) -> PickerResult<Vec<Member>> {
    if count == 0 {
        return Err(PickerError::InvalidSampleCount);
    }

    let odds = Odds::new(count, members.len());
    tracing::info!(
        population = members.len(),
        picks = count,
        "There were {} people in the final group, so the odds were {}",
        members.len(),
        odds
    );

    if count > members.len() {
        return Err(PickerError::SampleSizeExceeded {
            requested: count,
            available: members.len(),
        });
    }

    Ok(members.choose_multiple(rng, count).cloned().collect())
}
