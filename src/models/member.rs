//! Member model and the upstream record it is projected from.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A community member as seen by the picker.
///
/// `created_at` is always sent by the upstream API, but a value that does not
/// parse is carried as `None` instead of failing the whole directory scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// One page of the community members endpoint.
#[derive(Debug, Deserialize)]
pub struct MembersPage {
    #[serde(default)]
    pub records: Vec<UpstreamMember>,
}

/// Upstream member record. Fields the picker does not use are dropped.
#[derive(Debug, Deserialize)]
pub struct UpstreamMember {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_seen_at: Option<String>,
    #[serde(default)]
    pub community_id: Option<serde_json::Value>,
}

impl UpstreamMember {
    /// Community identifier, whether the API sent it as a number or a string.
    pub fn community_id(&self) -> Option<String> {
        match self.community_id.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl From<UpstreamMember> for Member {
    fn from(record: UpstreamMember) -> Self {
        Member {
            created_at: record.created_at.as_deref().and_then(parse_timestamp),
            last_seen_at: record.last_seen_at.as_deref().and_then(parse_timestamp),
            name: record.name,
            email: record.email,
        }
    }
}

/// Parse an upstream timestamp into UTC.
///
/// Accepts RFC 3339, naive ISO-8601 date-times (taken as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_projection_drops_extra_fields() {
        let page: MembersPage = serde_json::from_value(serde_json::json!({
            "page": 1,
            "records": [{
                "id": 42,
                "name": "Alice",
                "email": "alice@example.com",
                "created_at": "2024-05-03T10:00:00.000Z",
                "last_seen_at": null,
                "community_id": 9001,
                "posts_count": 7
            }]
        }))
        .unwrap();

        let record = page.records.into_iter().next().unwrap();
        assert_eq!(record.community_id().as_deref(), Some("9001"));

        let member = Member::from(record);
        assert_eq!(member.name.as_deref(), Some("Alice"));
        assert_eq!(
            member.created_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 3, 10, 0, 0).unwrap())
        );
        assert!(member.last_seen_at.is_none());
    }

    #[test]
    fn test_unparsable_timestamp_becomes_none() {
        let record = UpstreamMember {
            name: Some("Bob".to_string()),
            email: None,
            created_at: Some("yesterday-ish".to_string()),
            last_seen_at: Some("2024-02-30T00:00:00Z".to_string()),
            community_id: None,
        };

        let member = Member::from(record);
        assert!(member.created_at.is_none());
        assert!(member.last_seen_at.is_none());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-15T08:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T10:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T08:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-15"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_community_id_as_string() {
        let record: UpstreamMember =
            serde_json::from_value(serde_json::json!({ "community_id": "abc" })).unwrap();
        assert_eq!(record.community_id().as_deref(), Some("abc"));
    }
}
