//! Aggregate report models used for the summary charts.

use serde::Serialize;

/// Cumulative counts of members by how recently they were seen.
///
/// Each tier includes the ones before it; `total` is the full directory size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecencyReport {
    pub today: usize,
    pub this_week: usize,
    pub this_month: usize,
    pub last_two_months: usize,
    pub total: usize,
}

/// Number of accounts created in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortEntry {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
}

/// Both global reports for a community.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub recency: RecencyReport,
    pub cohorts: Vec<CohortEntry>,
}
