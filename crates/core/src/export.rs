//! User data export format.
//!
//! An export is a JSON array with one [`ExportRecord`] per question, newest
//! first. The field names are part of the published artifact format and must
//! not change.

use serde::{Deserialize, Serialize};

use crate::types::{JobId, Timestamp};

/// `strftime` pattern for the `date_posted` field.
pub const DATE_POSTED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Pattern used when the timestamp has no sub-second part.
pub const DATE_POSTED_WHOLE_SECONDS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// File extension of export artifacts.
pub const ARTIFACT_EXTENSION: &str = "json";

/// One exported question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub username: String,
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Description")]
    pub description: String,
    pub date_posted: String,
}

impl ExportRecord {
    pub fn new(username: &str, title: &str, content: &str, posted_at: Timestamp) -> Self {
        Self {
            username: username.to_string(),
            question: title.to_string(),
            description: content.to_string(),
            date_posted: format_date_posted(posted_at),
        }
    }
}

/// Render a post timestamp the way it appears in export artifacts.
///
/// Microseconds are printed as six digits, and left out entirely when zero.
pub fn format_date_posted(posted_at: Timestamp) -> String {
    let format = if posted_at.timestamp_subsec_micros() == 0 {
        DATE_POSTED_WHOLE_SECONDS_FORMAT
    } else {
        DATE_POSTED_FORMAT
    };
    posted_at.format(format).to_string()
}

/// Artifact file name for an export job.
///
/// Keyed by job id so that concurrent exports for the same user never share
/// a path. Characters outside `[A-Za-z0-9_-]` in the username are replaced
/// with `_` so the name is always a single path component.
pub fn artifact_file_name(username: &str, job_id: JobId) -> String {
    let safe: String = username
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{safe}-{job_id}.{ARTIFACT_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_serializes_with_artifact_field_names() {
        let posted = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).unwrap();
        let record = ExportRecord::new("alice", "Q2", "why?", posted);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["Question"], "Q2");
        assert_eq!(json["Description"], "why?");
        assert_eq!(json["date_posted"], "2024-03-01 10:05:00");
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[test]
    fn date_posted_keeps_microseconds() {
        let posted = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).unwrap()
            + chrono::Duration::microseconds(26_490);
        assert_eq!(format_date_posted(posted), "2024-03-01 10:05:00.026490");
    }

    #[test]
    fn date_posted_truncates_below_microseconds() {
        let posted = chrono::Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).unwrap()
            + chrono::Duration::nanoseconds(999);
        assert_eq!(format_date_posted(posted), "2024-03-01 10:05:00");
    }

    #[test]
    fn artifact_names_differ_per_job() {
        let a = artifact_file_name("alice", uuid::Uuid::new_v4());
        let b = artifact_file_name("alice", uuid::Uuid::new_v4());
        assert_ne!(a, b);
        assert!(a.starts_with("alice-"));
        assert!(a.ends_with(".json"));
    }

    #[test]
    fn artifact_name_cannot_escape_directory() {
        let name = artifact_file_name("../etc/passwd", uuid::Uuid::nil());
        assert!(!name.contains('/'));
        assert!(name.starts_with("___etc_passwd-"));
    }
}
