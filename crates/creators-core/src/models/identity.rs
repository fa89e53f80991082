use serde::{Deserialize, Serialize};

/// Record of the Identity domain. Read-only from the dashboard's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Identity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    // Free-form, unlike the managed domains
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
