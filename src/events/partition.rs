use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::dto::Event;
use crate::profiles::tabs::SubTab;

/// Flattens `{ "event": {...}, ...}` wrappers. Keys of the nested event win
/// over top-level echoes; siblings such as `timeslots` are kept. Anything
/// that is not a wrapper is returned unchanged.
pub fn normalize_event(value: Value) -> Value {
    match value {
        Value::Object(mut outer) => match outer.remove("event") {
            Some(Value::Object(inner)) => {
                let mut merged: Map<String, Value> = outer;
                if let Value::Object(inner) = normalize_event(Value::Object(inner)) {
                    merged.extend(inner);
                }
                Value::Object(merged)
            }
            Some(other) => {
                outer.insert("event".into(), other);
                Value::Object(outer)
            }
            None => Value::Object(outer),
        },
        other => other,
    }
}

pub fn normalize(items: Vec<Value>) -> Vec<Value> {
    items.into_iter().map(normalize_event).collect()
}

/// Decodes already-normalized items. Non-object items are skipped.
pub fn decode_events(items: Vec<Value>) -> Vec<Event> {
    items
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<Event>(v) {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(error = %e, "skipping malformed event");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventPartition {
    pub running: Vec<Event>,
    pub past: Vec<Event>,
}

impl EventPartition {
    pub fn len(&self) -> usize {
        self.running.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn side(&self, sub: SubTab) -> &[Event] {
        match sub {
            SubTab::Running => &self.running,
            SubTab::Past => &self.past,
        }
    }

    /// Message shown in place of an empty side.
    pub fn empty_message(sub: SubTab) -> String {
        format!("No {} events.", sub.as_str())
    }
}

/// Stable split on `is_active`.
pub fn partition(events: Vec<Event>) -> EventPartition {
    let (running, past) = events.into_iter().partition(|e| e.is_active);
    EventPartition { running, past }
}

/// Normalize, decode and split raw backend items in one pass.
pub fn split_running_past(items: Vec<Value>) -> EventPartition {
    partition(decode_events(normalize(items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn mixed() -> Vec<Value> {
        vec![
            json!({"id": "1", "title": "Hackathon", "isActive": true}),
            json!({"event": {"id": "2", "title": "Meetup", "isActive": false}, "timeslots": []}),
            json!({"id": "3", "isActive": false, "event": {"id": "3", "isActive": true}}),
            json!({"id": "4"}),
            json!({"event": {"id": "5", "isActive": true}}),
        ]
    }

    #[test]
    fn nested_fields_override_top_level_echoes() {
        let out = normalize_event(json!({
            "id": "3", "isActive": false, "timeslots": [1],
            "event": {"id": "3", "isActive": true, "title": "Inner"}
        }));
        assert_eq!(
            out,
            json!({"id": "3", "isActive": true, "title": "Inner", "timeslots": [1]})
        );
    }

    #[test]
    fn non_object_event_key_is_left_alone() {
        let v = json!({"id": "x", "event": "launch"});
        assert_eq!(normalize_event(v.clone()), v);
        assert_eq!(normalize_event(json!(7)), json!(7));
    }

    #[test]
    fn partition_keeps_every_event_once_and_in_order() {
        let input = mixed();
        let split = split_running_past(input.clone());

        assert_eq!(split.len(), input.len());
        let ids: BTreeSet<_> = split
            .running
            .iter()
            .chain(split.past.iter())
            .map(|e| e.id.clone())
            .collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"].into_iter().map(String::from).collect());

        let running: Vec<_> = split.running.iter().map(|e| e.id.as_str()).collect();
        let past: Vec<_> = split.past.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(running, ["1", "3", "5"]);
        assert_eq!(past, ["2", "4"]);
        assert!(split.running.iter().all(|e| e.is_active));
        assert!(split.past.iter().all(|e| !e.is_active));
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let once = normalize(mixed());
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
        assert_eq!(
            partition(decode_events(twice)),
            partition(decode_events(once))
        );
    }

    #[test]
    fn empty_input_gives_empty_sides() {
        let split = split_running_past(Vec::new());
        assert!(split.is_empty());
        assert!(split.side(SubTab::Running).is_empty());
        assert_eq!(EventPartition::empty_message(SubTab::Past), "No past events.");
    }
}
