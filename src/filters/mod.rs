//! Composable member filters.
//!
//! Every filter only removes members. A pipeline applies its filters in order:
//! last seen, account creation, then staff exclusion.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::models::{CreatedWindow, FilterSpec, LastSeenWindow, Member};

/// Emails containing this marker belong to the community operator's staff.
pub const STAFF_EMAIL_MARKER: &str = "gigg";

/// Names containing this marker are admin accounts.
pub const ADMIN_NAME_MARKER: &str = "admin";

/// A predicate over members.
pub trait MemberFilter: Send + Sync {
    /// Check if a member should be kept.
    fn matches(&self, member: &Member) -> bool;

    /// Human-readable description for logs.
    fn description(&self) -> String;
}

/// Keeps members seen at or after an instant. Never-seen members are dropped.
#[derive(Debug, Clone)]
pub struct LastSeenFilter {
    since: DateTime<Utc>,
}

impl LastSeenFilter {
    pub fn since(since: DateTime<Utc>) -> Self {
        Self { since }
    }

    /// Build the filter for a window relative to `now`. `None` means no filtering.
    pub fn for_window(window: LastSeenWindow, now: DateTime<Utc>) -> Option<Self> {
        let since = match window {
            LastSeenWindow::None => return None,
            LastSeenWindow::Today => start_of_day(now),
            LastSeenWindow::ThisWeek => now - Duration::days(7),
            LastSeenWindow::ThisMonth => start_of_month(now),
        };
        Some(Self::since(since))
    }
}

impl MemberFilter for LastSeenFilter {
    fn matches(&self, member: &Member) -> bool {
        member.last_seen_at.is_some_and(|seen| seen >= self.since)
    }

    fn description(&self) -> String {
        format!("last_seen(since={})", self.since.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Keeps members whose account was created inside an inclusive window.
#[derive(Debug, Clone)]
pub struct CreatedFilter {
    from: DateTime<Utc>,
    until: Option<DateTime<Utc>>,
}

impl CreatedFilter {
    pub fn between(from: DateTime<Utc>, until: Option<DateTime<Utc>>) -> Self {
        Self { from, until }
    }

    /// Build the filter for a window. `OnLaunch` ignores `now`.
    pub fn for_window(window: CreatedWindow, now: DateTime<Utc>) -> Option<Self> {
        match window {
            CreatedWindow::None => None,
            CreatedWindow::ThisMonth => Some(Self::between(start_of_month(now), None)),
            CreatedWindow::LastTwoMonths => {
                Some(Self::between(start_of_previous_month(now), None))
            }
            CreatedWindow::OnLaunch => {
                let (from, until) = launch_window();
                Some(Self::between(from, Some(until)))
            }
        }
    }
}

impl MemberFilter for CreatedFilter {
    fn matches(&self, member: &Member) -> bool {
        let Some(created) = member.created_at else {
            return false;
        };

        created >= self.from && self.until.map_or(true, |until| created <= until)
    }

    fn description(&self) -> String {
        match self.until {
            Some(until) => format!(
                "created(from={}, until={})",
                self.from.format("%Y-%m-%d %H:%M:%S"),
                until.format("%Y-%m-%d %H:%M:%S")
            ),
            None => format!("created(from={})", self.from.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Drops staff and admin accounts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaffFilter;

impl MemberFilter for StaffFilter {
    fn matches(&self, member: &Member) -> bool {
        !contains_ignore_case(member.email.as_deref(), STAFF_EMAIL_MARKER)
            && !contains_ignore_case(member.name.as_deref(), ADMIN_NAME_MARKER)
    }

    fn description(&self) -> String {
        format!(
            "exclude_staff(email~{}, name~{})",
            STAFF_EMAIL_MARKER, ADMIN_NAME_MARKER
        )
    }
}

fn contains_ignore_case(value: Option<&str>, needle: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains(needle))
}

/// Ordered set of filters applied one after another.
#[derive(Default)]
pub struct FilterPipeline {
    filters: Vec<Box<dyn MemberFilter>>,
}

impl FilterPipeline {
    /// Create an empty pipeline. It keeps every member.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter (builder pattern).
    pub fn with_filter(mut self, filter: Box<dyn MemberFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Build the pipeline for a filter selection evaluated at `now`.
    pub fn from_spec(spec: &FilterSpec, now: DateTime<Utc>) -> Self {
        let mut pipeline = Self::new();

        if let Some(filter) = LastSeenFilter::for_window(spec.last_seen, now) {
            pipeline = pipeline.with_filter(Box::new(filter));
        }
        if let Some(filter) = CreatedFilter::for_window(spec.created, now) {
            pipeline = pipeline.with_filter(Box::new(filter));
        }
        if spec.exclude_admins {
            pipeline = pipeline.with_filter(Box::new(StaffFilter));
        }

        pipeline
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.description()).collect()
    }

    /// Narrow `members` through every filter, preserving order.
    pub fn apply(&self, members: &[Member]) -> Vec<Member> {
        let mut kept: Vec<Member> = members.to_vec();
        for filter in &self.filters {
            let before = kept.len();
            kept.retain(|m| filter.matches(m));
            tracing::debug!(
                filter = %filter.description(),
                before,
                after = kept.len(),
                "Applied member filter"
            );
        }
        kept
    }
}

/// Exact, case-insensitive name lookup parsed from a comma-separated list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameQuery {
    /// Requested names as typed (trimmed), deduplicated case-insensitively.
    names: Vec<String>,
}

/// Members found by a name query plus the requested names nobody has.
#[derive(Debug, Clone, Default)]
pub struct NameMatches {
    pub members: Vec<Member>,
    pub unknown: Vec<String>,
}

impl NameQuery {
    pub fn parse(list: &str) -> Self {
        let mut seen = HashSet::new();
        let names = list
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.to_lowercase()))
            .map(str::to_string)
            .collect();

        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Keep members whose lowercased name equals one of the requested names.
    pub fn apply(&self, members: &[Member]) -> NameMatches {
        let wanted: HashSet<String> = self.names.iter().map(|n| n.to_lowercase()).collect();
        let mut found = HashSet::new();

        let matched: Vec<Member> = members
            .iter()
            .filter(|member| {
                let Some(name) = member.name.as_deref() else {
                    return false;
                };
                let key = name.to_lowercase();
                if wanted.contains(&key) {
                    found.insert(key);
                    true
                } else {
                    false
                }
            })
            .cloned()
            .collect();

        let unknown = self
            .names
            .iter()
            .filter(|name| !found.contains(&name.to_lowercase()))
            .cloned()
            .collect();

        NameMatches {
            members: matched,
            unknown,
        }
    }
}

/// UTC midnight of the day containing `now`.
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    midnight(now.date_naive())
}

/// UTC midnight of the Monday of the calendar week containing `now`.
pub fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_since_monday = i64::from(now.weekday().num_days_from_monday());
    start_of_day(now) - Duration::days(days_since_monday)
}

/// First instant of the calendar month containing `now`.
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    first_of_month(now.year(), now.month())
}

/// First instant of the calendar month before the one containing `now`.
pub fn start_of_previous_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = previous_month(now.year(), now.month());
    first_of_month(year, month)
}

/// The `(year, month)` before the given one; January rolls back to December.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month > 1 {
        (year, month - 1)
    } else {
        (year - 1, 12)
    }
}

/// The fixed May 2024 launch cohort window, inclusive on both ends.
pub fn launch_window() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        first_of_month(2024, 5),
        first_of_month(2024, 6) - Duration::seconds(1),
    )
}

fn first_of_month(year: i32, month: u32) -> DateTime<Utc> {
    // Day 1 exists for every month chrono can represent.
    midnight(NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default())
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    fn member(
        name: &str,
        email: &str,
        created: DateTime<Utc>,
        seen: Option<DateTime<Utc>>,
    ) -> Member {
        Member {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            created_at: Some(created),
            last_seen_at: seen,
        }
    }

    fn seen(name: &str, last_seen: Option<DateTime<Utc>>) -> Member {
        member(name, "x@example.com", at(2023, 1, 1, 0, 0, 0), last_seen)
    }

    fn created(name: &str, created_at: DateTime<Utc>) -> Member {
        member(name, "x@example.com", created_at, None)
    }

    fn names(members: &[Member]) -> Vec<&str> {
        members.iter().filter_map(|m| m.name.as_deref()).collect()
    }

    #[test]
    fn test_today_boundary() {
        let now = at(2024, 6, 12, 15, 0, 0);
        let rows = vec![
            seen("yesterday", Some(at(2024, 6, 11, 23, 59, 59))),
            seen("today", Some(at(2024, 6, 12, 0, 0, 1))),
            seen("never", None),
        ];

        let filter = LastSeenFilter::for_window(LastSeenWindow::Today, now).unwrap();
        let pipeline = FilterPipeline::new().with_filter(Box::new(filter));

        assert_eq!(names(&pipeline.apply(&rows)), vec!["today"]);
    }

    #[test]
    fn test_this_week_is_rolling_seven_days() {
        let now = at(2024, 6, 12, 15, 0, 0);
        let rows = vec![
            seen("eight_days", Some(at(2024, 6, 4, 15, 0, 0))),
            seen("six_days", Some(at(2024, 6, 6, 9, 0, 0))),
            seen("exactly_seven", Some(at(2024, 6, 5, 15, 0, 0))),
        ];

        let pipeline = FilterPipeline::from_spec(
            &FilterSpec {
                last_seen: LastSeenWindow::ThisWeek,
                created: CreatedWindow::None,
                exclude_admins: false,
            },
            now,
        );

        assert_eq!(names(&pipeline.apply(&rows)), vec!["six_days", "exactly_seven"]);
    }

    #[test]
    fn test_this_month_is_calendar_month() {
        let now = at(2024, 6, 2, 8, 0, 0);
        let rows = vec![
            seen("may", Some(at(2024, 5, 31, 23, 0, 0))),
            seen("june", Some(at(2024, 6, 1, 0, 0, 0))),
            seen("never", None),
        ];

        let filter = LastSeenFilter::for_window(LastSeenWindow::ThisMonth, now).unwrap();
        let pipeline = FilterPipeline::new().with_filter(Box::new(filter));

        assert_eq!(names(&pipeline.apply(&rows)), vec!["june"]);
    }

    #[test]
    fn test_none_windows_build_no_filters() {
        let now = at(2024, 6, 2, 8, 0, 0);
        assert!(LastSeenFilter::for_window(LastSeenWindow::None, now).is_none());
        assert!(CreatedFilter::for_window(CreatedWindow::None, now).is_none());

        let spec = FilterSpec {
            exclude_admins: false,
            ..FilterSpec::default()
        };
        let pipeline = FilterPipeline::from_spec(&spec, now);
        assert!(pipeline.is_empty());

        let rows = vec![seen("never", None)];
        assert_eq!(pipeline.apply(&rows), rows);
    }

    #[test]
    fn test_on_launch_is_fixed_window() {
        let now = at(2026, 1, 10, 0, 0, 0);
        let rows = vec![
            created("april", at(2024, 4, 30, 12, 0, 0)),
            created("mid_may", at(2024, 5, 15, 12, 0, 0)),
            created("last_second", at(2024, 5, 31, 23, 59, 59)),
            created("june", at(2024, 6, 1, 0, 0, 0)),
        ];

        let filter = CreatedFilter::for_window(CreatedWindow::OnLaunch, now).unwrap();
        let pipeline = FilterPipeline::new().with_filter(Box::new(filter));

        assert_eq!(names(&pipeline.apply(&rows)), vec!["mid_may", "last_second"]);
    }

    #[test]
    fn test_last_two_months_in_january_reaches_december() {
        let now = at(2025, 1, 20, 10, 0, 0);
        let rows = vec![
            created("november", at(2024, 11, 30, 23, 59, 59)),
            created("december", at(2024, 12, 1, 0, 0, 0)),
            created("january", at(2025, 1, 3, 0, 0, 0)),
        ];

        let filter = CreatedFilter::for_window(CreatedWindow::LastTwoMonths, now).unwrap();
        let pipeline = FilterPipeline::new().with_filter(Box::new(filter));

        assert_eq!(names(&pipeline.apply(&rows)), vec!["december", "january"]);
    }

    #[test]
    fn test_created_this_month_drops_unparsed_dates() {
        let now = at(2024, 6, 20, 10, 0, 0);
        let mut unknown = created("unknown", at(2024, 6, 5, 0, 0, 0));
        unknown.created_at = None;
        let rows = vec![created("june", at(2024, 6, 5, 0, 0, 0)), unknown];

        let filter = CreatedFilter::for_window(CreatedWindow::ThisMonth, now).unwrap();
        assert_eq!(
            names(&FilterPipeline::new().with_filter(Box::new(filter)).apply(&rows)),
            vec!["june"]
        );
    }

    #[test]
    fn test_staff_exclusion() {
        let base = at(2024, 1, 1, 0, 0, 0);
        let rows = vec![
            member("Bob", "bob@gigg.com", base, None),
            member("Bobby", "Bob@GIGG.com", base, None),
            member("admin_bob", "bob@example.com", base, None),
            member("bobadminson", "bob2@example.com", base, None),
            member("Carol", "carol@example.com", base, None),
            Member {
                name: None,
                email: None,
                created_at: Some(base),
                last_seen_at: None,
            },
        ];

        let kept = FilterPipeline::new()
            .with_filter(Box::new(StaffFilter))
            .apply(&rows);

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].name.as_deref(), Some("Carol"));
        assert!(kept[1].name.is_none());
    }

    #[test]
    fn test_pipeline_is_monotonic() {
        let now = at(2024, 6, 12, 15, 0, 0);
        let rows = vec![
            member("a", "a@example.com", at(2024, 6, 1, 0, 0, 0), Some(at(2024, 6, 12, 1, 0, 0))),
            member("admin", "b@example.com", at(2024, 6, 1, 0, 0, 0), Some(now)),
            member("c", "c@gigg.com", at(2024, 5, 1, 0, 0, 0), None),
            member("d", "d@example.com", at(2024, 3, 1, 0, 0, 0), Some(at(2024, 6, 10, 0, 0, 0))),
        ];

        let specs = [
            FilterSpec::default(),
            FilterSpec {
                last_seen: LastSeenWindow::Today,
                created: CreatedWindow::ThisMonth,
                exclude_admins: true,
            },
            FilterSpec {
                last_seen: LastSeenWindow::ThisWeek,
                created: CreatedWindow::LastTwoMonths,
                exclude_admins: false,
            },
            FilterSpec {
                last_seen: LastSeenWindow::ThisMonth,
                created: CreatedWindow::OnLaunch,
                exclude_admins: true,
            },
        ];

        for spec in specs {
            let kept = FilterPipeline::from_spec(&spec, now).apply(&rows);
            assert!(kept.len() <= rows.len());
            assert!(kept.iter().all(|m| rows.contains(m)), "{:?}", spec);
        }

        let strict = FilterPipeline::from_spec(
            &FilterSpec {
                last_seen: LastSeenWindow::Today,
                created: CreatedWindow::ThisMonth,
                exclude_admins: true,
            },
            now,
        );
        assert_eq!(strict.len(), 3);
        assert_eq!(names(&strict.apply(&rows)), vec!["a"]);
    }

    #[test]
    fn test_name_query_reports_unknown_names() {
        let base = at(2024, 1, 1, 0, 0, 0);
        let rows = vec![
            member("ALICE", "alice@example.com", base, None),
            member("Alice Cooper", "cooper@example.com", base, None),
            member("bob", "bob@example.com", base, None),
        ];

        let query = NameQuery::parse("Alice, Unknown Person");
        let found = query.apply(&rows);

        assert_eq!(names(&found.members), vec!["ALICE"]);
        assert_eq!(found.unknown, vec!["Unknown Person".to_string()]);
    }

    #[test]
    fn test_name_query_parsing() {
        let query = NameQuery::parse(" alice ,, Bob,ALICE , ");
        assert_eq!(query.names(), &["alice".to_string(), "Bob".to_string()]);
        assert!(NameQuery::parse(" , ").is_empty());
    }

    #[test]
    fn test_calendar_helpers() {
        let wednesday = at(2024, 6, 12, 15, 30, 0);
        assert_eq!(start_of_day(wednesday), at(2024, 6, 12, 0, 0, 0));
        assert_eq!(start_of_week(wednesday), at(2024, 6, 10, 0, 0, 0));
        assert_eq!(start_of_month(wednesday), at(2024, 6, 1, 0, 0, 0));
        assert_eq!(start_of_previous_month(wednesday), at(2024, 5, 1, 0, 0, 0));

        let monday = at(2024, 6, 10, 0, 0, 0);
        assert_eq!(start_of_week(monday), monday);
        assert_eq!(previous_month(2024, 1), (2023, 12));
    }
}
