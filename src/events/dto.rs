use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::profiles::dto::Profile;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// `on-site` or `online`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub required_skill_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub sponsor_names: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Card heading; untitled events show their id.
    pub fn heading(&self) -> String {
        match self.title.as_deref().filter(|t| !t.trim().is_empty()) {
            Some(t) => t.to_string(),
            None => format!("Event {}", self.id),
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_active {
            "Running"
        } else {
            "Past"
        }
    }
}

/// Only a literal `true` marks an event as running; `null` or a missing key is past.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(v, Some(Value::Bool(true))))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Lookup row used to turn organization ids into labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, alias = "isVerified")]
    pub verified: bool,
}

/// One page of `GET /api/events/{id}/registered-participants`. Missing
/// counters read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPage {
    #[serde(default)]
    pub participants: Vec<Profile>,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_count: u64,
}

impl ParticipantPage {
    pub fn has_page(&self, page: u32) -> bool {
        page < self.total_pages
    }
}

/// Body of `POST /api/scheduled-tasks/deactivate-expired-events`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_true_is_active() {
        let running: Event = serde_json::from_value(json!({"id": "1", "isActive": true})).unwrap();
        let null: Event = serde_json::from_value(json!({"id": "2", "isActive": null})).unwrap();
        let string: Event =
            serde_json::from_value(json!({"id": "3", "isActive": "true"})).unwrap();
        let missing: Event = serde_json::from_value(json!({"id": "4"})).unwrap();
        assert!(running.is_active);
        assert!(!null.is_active);
        assert!(!string.is_active);
        assert!(!missing.is_active);
    }

    #[test]
    fn heading_falls_back_to_id() {
        let e = Event {
            id: "e9".into(),
            ..Default::default()
        };
        assert_eq!(e.heading(), "Event e9");
        assert_eq!(e.status_label(), "Past");
    }

    #[test]
    fn participant_page_defaults_missing_counters() {
        let page: ParticipantPage =
            serde_json::from_value(json!({"participants": [{"name": "Nadia"}]})).unwrap();
        assert_eq!(page.participants.len(), 1);
        assert_eq!((page.current_page, page.total_pages, page.total_count), (0, 0, 0));
        assert!(!page.has_page(0));
    }

    #[test]
    fn skill_accepts_mongo_style_id() {
        let s: Skill = serde_json::from_value(json!({"_id": "s1", "name": "Rust"})).unwrap();
        assert_eq!(s.id, "s1");
    }
}
