//! The one place that knows about the backend's inconsistent response shapes.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::events::dto::Event;
use crate::profiles::dto::Profile;
use crate::events::partition::{decode_events, normalize, normalize_event};

/// Collections arrive either bare or as a Spring page.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Items(Vec<T>),
    Page { content: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Items(v) | ListBody::Page { content: v } => v,
        }
    }
}

/// Spring page with its `last` flag. A bare array is a single, final page.
#[derive(Deserialize)]
#[serde(untagged)]
enum PageBody<T> {
    Items(Vec<T>),
    Page {
        content: Vec<T>,
        #[serde(default = "yes")]
        last: bool,
    },
}

fn yes() -> bool {
    true
}

/// One page of a directory listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryPage {
    pub items: Vec<Profile>,
    pub last: bool,
}

pub fn decode<T: DeserializeOwned>(path: &str, body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::decode(path, e))
}

pub fn list_of<T: DeserializeOwned>(path: &str, body: Value) -> Result<Vec<T>, ApiError> {
    decode::<ListBody<T>>(path, body).map(ListBody::into_vec)
}

pub fn event_list(path: &str, body: Value) -> Result<Vec<Event>, ApiError> {
    let raw = list_of::<Value>(path, body)?;
    Ok(decode_events(normalize(raw)))
}

pub fn directory_page(path: &str, body: Value) -> Result<DirectoryPage, ApiError> {
    Ok(match decode::<PageBody<Profile>>(path, body)? {
        PageBody::Items(items) => DirectoryPage { items, last: true },
        PageBody::Page { content, last } => DirectoryPage {
            items: content,
            last,
        },
    })
}

/// Events nested under an `events` key, as in `{ "events": [...] }`. A
/// missing key is an empty list; a bare list is accepted too.
pub fn keyed_event_list(path: &str, body: Value) -> Result<Vec<Event>, ApiError> {
    match body {
        Value::Object(mut map) => match map.remove("events") {
            Some(events) => event_list(path, events),
            None => Ok(Vec::new()),
        },
        other => event_list(path, other),
    }
}

/// A single event, flat or wrapped as `{event, timeslots}`.
pub fn single_event(path: &str, body: Value) -> Result<Event, ApiError> {
    match normalize_event(body) {
        v @ Value::Object(_) => decode(path, v),
        other => Err(ApiError::decode(path, format!("expected an event object, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_bare_and_paged_lists() {
        let bare = event_list("/api/events", json!([{"id": "a"}, {"id": "b"}])).unwrap();
        let paged = event_list(
            "/api/events",
            json!({"content": [{"id": "a"}, {"id": "b"}], "totalElements": 2}),
        )
        .unwrap();
        assert_eq!(bare, paged);
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn rejects_other_list_shapes() {
        let err = event_list("/api/events", json!({"items": []})).unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert!(event_list("/api/events", Value::Null).is_err());
    }

    #[test]
    fn wrapped_and_flat_single_events_decode_the_same() {
        let flat = single_event("/api/events/7", json!({"id": "7", "isActive": true})).unwrap();
        let wrapped = single_event(
            "/api/events/7",
            json!({"event": {"id": "7", "isActive": true}}),
        )
        .unwrap();
        assert_eq!(flat.id, wrapped.id);
        assert!(wrapped.is_active);
    }

    #[test]
    fn directory_pages_report_whether_more_remain() {
        let bare = directory_page("/api/organizer", json!([{"id": "g1"}])).unwrap();
        assert!(bare.last);
        let paged = directory_page(
            "/api/organization",
            json!({"content": [{"id": "o1"}], "last": false}),
        )
        .unwrap();
        assert_eq!(paged.items[0].id.as_deref(), Some("o1"));
        assert!(!paged.last);
    }

    #[test]
    fn keyed_events_unwrap_and_default_to_empty() {
        let events = keyed_event_list(
            "/api/events/user/fb",
            json!({"events": [{"event": {"id": "e1"}}]}),
        )
        .unwrap();
        assert_eq!(events[0].id, "e1");
        assert!(keyed_event_list("/api/events/user/fb", json!({}))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn null_single_event_is_a_decode_error() {
        assert!(single_event("/api/events/7", Value::Null).is_err());
    }
}
