//! Directory-wide statistics for the summary charts.
//!
//! Both reports read the unfiltered dataset.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};

use crate::filters::{previous_month, start_of_day, start_of_month, start_of_week};
use crate::models::{CohortEntry, Member, RecencyReport, StatsReport};

/// Accounts created before this year are left out of the cohort chart.
pub const COHORT_START_YEAR: i32 = 2024;

/// Count members into cumulative last-seen tiers relative to `now`.
///
/// Buckets are exclusive (today, rest of this calendar week, rest of this
/// calendar month, previous calendar month) and reported as running sums.
pub fn recency_report(members: &[Member], now: DateTime<Utc>) -> RecencyReport {
    let today = start_of_day(now);
    let week = start_of_week(now);
    let month = start_of_month(now);
    let (prev_year, prev_month) = previous_month(now.year(), now.month());

    let mut buckets = [0usize; 4];
    for seen in members.iter().filter_map(|m| m.last_seen_at) {
        let bucket = if seen >= today {
            0
        } else if seen >= week {
            1
        } else if seen >= month {
            2
        } else if seen.year() == prev_year && seen.month() == prev_month {
            3
        } else {
            continue;
        };
        buckets[bucket] += 1;
    }

    let this_week = buckets[0] + buckets[1];
    let this_month = this_week + buckets[2];

    RecencyReport {
        today: buckets[0],
        this_week,
        this_month,
        last_two_months: this_month + buckets[3],
        total: members.len(),
    }
}

/// Count accounts created per calendar month since [`COHORT_START_YEAR`].
///
/// Months without new accounts are omitted; entries are in chronological order.
pub fn monthly_cohorts(members: &[Member]) -> Vec<CohortEntry> {
    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();

    for created in members.iter().filter_map(|m| m.created_at) {
        if created.year() < COHORT_START_YEAR {
            continue;
        }
        *months.entry((created.year(), created.month())).or_default() += 1;
    }

    months
        .into_iter()
        .map(|((year, month), count)| CohortEntry {
            month: format!("{:04}-{:02}", year, month),
            count,
        })
        .collect()
}

/// Both reports at once.
pub fn stats_report(members: &[Member], now: DateTime<Utc>) -> StatsReport {
    StatsReport {
        recency: recency_report(members, now),
        cohorts: monthly_cohorts(members),
    }
}
