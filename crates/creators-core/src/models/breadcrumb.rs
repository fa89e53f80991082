use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit stamp written by the server on create and on every save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Breadcrumb {
    pub from_ip: String,
    pub by_user: String,
    /// Kept exactly as the server sent it; see `time()` for the parsed value
    pub at_time: String,
    pub correlation_id: String,
}

impl Breadcrumb {
    /// Parse `at_time`. RFC 3339 offsets are honored; timestamps without
    /// an offset are taken as UTC.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        if let Ok(at) = DateTime::parse_from_rfc3339(&self.at_time) {
            return Some(at.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.at_time, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// One-line description for listings, e.g. "user1 on Jan 01, 2024 from 127.0.0.1"
    pub fn summary(&self) -> String {
        let when = self
            .time()
            .map(|at| at.format("%b %d, %Y").to_string())
            .unwrap_or_else(|| self.at_time.clone());
        format!("{} on {} from {}", self.by_user, when, self.from_ip)
    }
}
