use std::collections::HashMap;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::dto::{Event, Organization, Skill};
use crate::api::ApiClient;

/// Loads events for a list of ids. One batched call is tried first; if it
/// fails in any way, ids are fetched one by one and ids that fail are left
/// out. Never fails as a whole. Once `cancel` fires no further requests
/// are issued and whatever was collected is returned.
pub async fn fetch_events_by_ids(
    api: &ApiClient,
    ids: &[String],
    cancel: &CancellationToken,
) -> Vec<Event> {
    if ids.is_empty() {
        return Vec::new();
    }

    match api.events_batch(ids).await {
        Ok(events) => return events,
        Err(e) => {
            warn!(error = %e, count = ids.len(), "batched event lookup failed; fetching one by one")
        }
    }

    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if cancel.is_cancelled() {
            debug!("event lookup cancelled");
            break;
        }
        match api.event(id).await {
            Ok(event) => out.push(event),
            Err(e) => debug!(error = %e, %id, "skipping event"),
        }
    }
    out
}

/// Data behind the all-events page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pub events: Vec<Event>,
    pub skill_names: HashMap<String, String>,
}

impl Catalog {
    /// Skill labels for an event, unknown ids shown as-is.
    pub fn skills_of(&self, event: &Event) -> Vec<String> {
        event
            .required_skill_ids
            .iter()
            .map(|id| self.skill_names.get(id).cloned().unwrap_or_else(|| id.clone()))
            .collect()
    }
}

pub fn skill_index(skills: Vec<Skill>) -> HashMap<String, String> {
    skills
        .into_iter()
        .filter(|s| !s.id.is_empty())
        .map(|s| (s.id, s.name))
        .collect()
}

/// Loads a page of events and the skill list together. Either failing
/// leaves an empty catalog and an error message.
pub async fn load_catalog(api: &ApiClient, page_size: u32) -> Result<Catalog, String> {
    let (events, skills) = tokio::join!(api.events_page(0, page_size), api.skills());
    let events = events.map_err(|e| {
        warn!(error = %e, "failed to load events");
        "Failed to load events".to_string()
    })?;
    let skills = skills.map_err(|e| {
        warn!(error = %e, "failed to load skills");
        "Failed to load skills".to_string()
    })?;
    info!(events = events.len(), skills = skills.len(), "catalog loaded");
    Ok(Catalog {
        events,
        skill_names: skill_index(skills),
    })
}

/// Organization id to display name. A failed lookup yields an empty map.
pub async fn organization_names(api: &ApiClient) -> HashMap<String, String> {
    match api.organizations().await {
        Ok(orgs) => orgs
            .into_iter()
            .map(|Organization { id, name, .. }| (id, name))
            .collect(),
        Err(e) => {
            warn!(error = %e, "failed to load organizations");
            HashMap::new()
        }
    }
}
