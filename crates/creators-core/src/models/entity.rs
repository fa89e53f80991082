//! Records of the Profile, Platform and User domains.
//!
//! All three domains share one shape on the wire, so they share one
//! struct. The aliases keep call sites readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Breadcrumb;

/// Lifecycle status of a managed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum Status {
    Active,
    Archived,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Archived => "archived",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "archived" => Ok(Status::Archived),
            other => Err(format!("unknown status '{}', expected active or archived", other)),
        }
    }
}

/// A server-owned record. `id`, `created` and `saved` are written by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Entity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    pub created: Breadcrumb,
    pub saved: Breadcrumb,
}

pub type Profile = Entity;
pub type Platform = Entity;
pub type User = Entity;

impl Entity {
    pub fn is_archived(&self) -> bool {
        self.status == Some(Status::Archived)
    }

    /// True when the record was saved after it was created. Stamps that
    /// do not parse are compared as text.
    pub fn was_modified(&self) -> bool {
        match (self.created.time(), self.saved.time()) {
            (Some(created), Some(saved)) => saved > created,
            _ => self.saved.at_time != self.created.at_time,
        }
    }
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct EntityInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl EntityInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            status: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

/// Partial update. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct EntityUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl EntityUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.status.is_none()
    }
}

/// Response to a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CreatedId {
    #[serde(rename = "_id")]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLATFORM_JSON: &str = r#"{
        "_id": "507f1f77bcf86cd799439011",
        "name": "test-platform",
        "description": "Test description",
        "status": "active",
        "created": {"from_ip": "127.0.0.1", "by_user": "user1", "at_time": "2024-01-01T00:00:00Z", "correlation_id": "corr-123"},
        "saved": {"from_ip": "127.0.0.1", "by_user": "user2", "at_time": "2024-02-01T00:00:00Z", "correlation_id": "corr-456"}
    }"#;

    #[test]
    fn test_parse_entity() {
        let platform: Platform = serde_json::from_str(PLATFORM_JSON).expect("platform should parse");
        assert_eq!(platform.id, "507f1f77bcf86cd799439011");
        assert_eq!(platform.status, Some(Status::Active));
        assert!(!platform.is_archived());
        assert!(platform.was_modified());
        assert_eq!(platform.saved.by_user, "user2");
    }

    #[test]
    fn test_was_modified_compares_instants_across_offsets() {
        let json = r#"{"_id":"1","name":"tz",
            "created":{"from_ip":"::1","by_user":"u","at_time":"2024-01-01T00:00:00Z","correlation_id":"c"},
            "saved":{"from_ip":"::1","by_user":"u","at_time":"2024-01-01T02:00:00+02:00","correlation_id":"c"}}"#;
        let entity: Entity = serde_json::from_str(json).expect("entity should parse");
        // Same instant written with different offsets
        assert!(!entity.was_modified());
        assert_eq!(entity.saved.at_time, "2024-01-01T02:00:00+02:00");
    }

    #[test]
    fn test_entity_optional_fields_absent() {
        let json = r#"{"_id":"1","name":"bare",
            "created":{"from_ip":"::1","by_user":"u","at_time":"2024-01-01T00:00:00Z","correlation_id":"c"},
            "saved":{"from_ip":"::1","by_user":"u","at_time":"2024-01-01T00:00:00Z","correlation_id":"c"}}"#;
        let entity: Entity = serde_json::from_str(json).expect("entity should parse");
        assert_eq!(entity.description, None);
        assert_eq!(entity.status, None);
        assert!(!entity.was_modified());

        let value = serde_json::to_value(&entity).unwrap();
        assert!(value.get("description").is_none());
        assert_eq!(value["_id"], "1");
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = EntityUpdate {
            name: Some("updated-name".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"name":"updated-name"}"#);
        assert!(EntityUpdate::default().is_empty());
    }

    #[test]
    fn test_input_builder() {
        let input = EntityInput::new("new-platform")
            .description("New description")
            .status(Status::Archived);
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            serde_json::json!({"name": "new-platform", "description": "New description", "status": "archived"})
        );
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("active".parse::<Status>(), Ok(Status::Active));
        assert_eq!("ARCHIVED".parse::<Status>(), Ok(Status::Archived));
        assert!("deleted".parse::<Status>().is_err());
    }
}
