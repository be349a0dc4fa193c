//! Filter selection models.
//!
//! Labels on the wire are the ones shown to community admins. An unknown label
//! is rejected instead of silently meaning "no filter".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::PickerError;

/// How recently a member must have visited the community.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LastSeenWindow {
    #[default]
    None,
    Today,
    /// Rolling seven days, not the calendar week.
    ThisWeek,
    ThisMonth,
}

impl LastSeenWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            LastSeenWindow::None => "None",
            LastSeenWindow::Today => "Today",
            LastSeenWindow::ThisWeek => "This Week",
            LastSeenWindow::ThisMonth => "This Month",
        }
    }
}

impl FromStr for LastSeenWindow {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "None" => Ok(LastSeenWindow::None),
            "Today" => Ok(LastSeenWindow::Today),
            "This Week" => Ok(LastSeenWindow::ThisWeek),
            "This Month" => Ok(LastSeenWindow::ThisMonth),
            other => Err(PickerError::InvalidFilter(format!(
                "last seen window {:?}",
                other
            ))),
        }
    }
}

/// When a member's account must have been created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CreatedWindow {
    #[default]
    None,
    ThisMonth,
    /// This month and the one before it.
    LastTwoMonths,
    /// Fixed launch cohort, May 2024.
    OnLaunch,
}

impl CreatedWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreatedWindow::None => "None",
            CreatedWindow::ThisMonth => "This Month",
            CreatedWindow::LastTwoMonths => "Last Two Months",
            CreatedWindow::OnLaunch => "On Launch",
        }
    }
}

impl FromStr for CreatedWindow {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "None" => Ok(CreatedWindow::None),
            "This Month" => Ok(CreatedWindow::ThisMonth),
            "Last Two Months" | "Last 2 Months" => Ok(CreatedWindow::LastTwoMonths),
            "On Launch" => Ok(CreatedWindow::OnLaunch),
            other => Err(PickerError::InvalidFilter(format!(
                "account creation window {:?}",
                other
            ))),
        }
    }
}

macro_rules! label_conversions {
    ($ty:ty) => {
        impl TryFrom<String> for $ty {
            type Error = PickerError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_conversions!(LastSeenWindow);
label_conversions!(CreatedWindow);

/// Combination of criteria used to narrow the member dataset before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default)]
    pub last_seen: LastSeenWindow,
    #[serde(default)]
    pub created: CreatedWindow,
    #[serde(default = "default_exclude_admins")]
    pub exclude_admins: bool,
}

fn default_exclude_admins() -> bool {
    true
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            last_seen: LastSeenWindow::None,
            created: CreatedWindow::None,
            exclude_admins: default_exclude_admins(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_spec_defaults() {
        let spec: FilterSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec, FilterSpec::default());
        assert!(spec.exclude_admins);
    }

    #[test]
    fn test_filter_spec_labels() {
        let spec: FilterSpec = serde_json::from_value(serde_json::json!({
            "lastSeen": "This Week",
            "created": "Last 2 Months",
            "excludeAdmins": false
        }))
        .unwrap();

        assert_eq!(spec.last_seen, LastSeenWindow::ThisWeek);
        assert_eq!(spec.created, CreatedWindow::LastTwoMonths);
        assert!(!spec.exclude_admins);

        let value = serde_json::to_value(spec).unwrap();
        assert_eq!(value["created"], "Last Two Months");
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let result: Result<FilterSpec, _> =
            serde_json::from_value(serde_json::json!({ "lastSeen": "Yesterday" }));
        assert!(result.is_err());

        assert!(matches!(
            "Next Month".parse::<CreatedWindow>(),
            Err(PickerError::InvalidFilter(_))
        ));
    }
}
