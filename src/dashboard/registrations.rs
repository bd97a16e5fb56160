//! Organizer dashboard: own events and who registered for each.

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::events::dto::ParticipantPage;
use crate::events::Event;
use crate::fetch::{Remote, Slot};
use crate::notices::Notices;
use crate::profiles::{Panel, Profile};

pub const PARTICIPANTS_PER_PAGE: u32 = 10;
pub const NO_EVENTS: &str = "No events found";
pub const NO_PARTICIPANTS: &str = "No participants yet";
const EXPORT_SIZE: u32 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParticipantsState {
    pub event_id: Option<String>,
    pub page: Remote<ParticipantPage>,
}

#[derive(Clone)]
pub struct RegistrationList {
    api: ApiClient,
    notices: Notices,
    firebase_uid: String,
    events: Slot<Remote<Vec<Event>>>,
    participants: Slot<ParticipantsState>,
}

impl RegistrationList {
    pub fn new(api: ApiClient, notices: Notices, firebase_uid: impl Into<String>) -> Self {
        Self {
            api,
            notices,
            firebase_uid: firebase_uid.into(),
            events: Slot::default(),
            participants: Slot::default(),
        }
    }

    #[instrument(skip(self))]
    pub async fn load_events(&self) {
        let token = self.events.begin_loading();
        match self.api.events_created_by(&self.firebase_uid).await {
            Ok(events) => {
                let count = events.len();
                if self.events.complete(&token, Remote::Ready(events)) {
                    info!(count, firebase_uid = %self.firebase_uid, "own events loaded");
                }
            }
            Err(e) => {
                let message = "Failed to fetch events";
                if self.events.complete(&token, Remote::Failed(message.into())) {
                    warn!(error = %e, firebase_uid = %self.firebase_uid, "own events failed");
                    self.notices.error(message);
                }
            }
        }
    }

    pub fn events_panel(&self) -> Panel<Vec<Event>> {
        self.events.with(|s| match s {
            Remote::Idle | Remote::Loading => Panel::Loading,
            Remote::Failed(_) => Panel::Empty(NO_EVENTS.into()),
            Remote::Ready(events) => Panel::of(events.clone(), events.is_empty(), NO_EVENTS),
        })
    }

    /// Picks an event and loads its first page of participants. Picking
    /// another event drops a page still in flight for the previous one.
    pub async fn select_event(&self, event_id: &str) {
        self.fetch_page(event_id, 0).await;
    }

    /// Moves to `page` of the selected event. Returns false, without a
    /// request, when nothing is selected or the page is out of range.
    pub async fn go_to_page(&self, page: u32) -> bool {
        let event_id = self.participants.with(|s| match (&s.event_id, &s.page) {
            (Some(id), Remote::Ready(current)) if current.has_page(page) => Some(id.clone()),
            _ => None,
        });
        match event_id {
            Some(id) => {
                self.fetch_page(&id, page).await;
                true
            }
            None => false,
        }
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, event_id: &str, page: u32) {
        let token = self.participants.begin(|s| {
            s.event_id = Some(event_id.to_string());
            s.page = Remote::Loading;
        });
        let result = self
            .api
            .registered_participants(event_id, page, PARTICIPANTS_PER_PAGE)
            .await;
        match result {
            Ok(p) => {
                let total = p.total_count;
                if self.participants.finish(&token, |s| s.page = Remote::Ready(p)) {
                    info!(event_id, page, total, "participants loaded");
                }
            }
            Err(e) => {
                let message = "Failed to fetch participants";
                if self
                    .participants
                    .finish(&token, |s| s.page = Remote::Failed(message.into()))
                {
                    warn!(error = %e, event_id, page, "participants failed");
                    self.notices.error(message);
                }
            }
        }
    }

    pub fn participants(&self) -> ParticipantsState {
        self.participants.snapshot()
    }

    /// `None` until an event is picked.
    pub fn participants_panel(&self) -> Option<Panel<Vec<Profile>>> {
        self.participants.with(|s| {
            s.event_id.as_ref()?;
            Some(match &s.page {
                Remote::Idle | Remote::Loading => Panel::Loading,
                Remote::Failed(_) => Panel::Empty(NO_PARTICIPANTS.into()),
                Remote::Ready(p) => Panel::of(
                    p.participants.clone(),
                    p.participants.is_empty(),
                    NO_PARTICIPANTS,
                ),
            })
        })
    }

    /// `{title}_participants.csv` for the selected event.
    pub fn export_file_name(&self) -> String {
        let selected = self.participants.with(|s| s.event_id.clone());
        let title = self.events.with(|s| {
            s.ready()
                .and_then(|events| events.iter().find(|e| Some(&e.id) == selected.as_ref()))
                .and_then(|e| e.title.clone())
                .filter(|t| !t.trim().is_empty())
        });
        format!("{}_participants.csv", title.as_deref().unwrap_or("event"))
    }

    /// Every participant of the selected event as CSV. A failed fetch is
    /// treated as an empty list.
    #[instrument(skip(self))]
    pub async fn export_csv(&self) -> Option<String> {
        let Some(event_id) = self.participants.with(|s| s.event_id.clone()) else {
            self.notices.error("Please select an event first");
            return None;
        };

        let rows = match self
            .api
            .registered_participants(&event_id, 0, EXPORT_SIZE)
            .await
        {
            Ok(p) => p.participants,
            Err(e) => {
                warn!(error = %e, %event_id, "participant export fetch failed");
                Vec::new()
            }
        };
        if rows.is_empty() {
            self.notices.error("No participants to export");
            return None;
        }

        self.notices
            .success(format!("Exported {} participants", rows.len()));
        Some(participants_csv(&rows))
    }
}

fn quoted(value: Option<&str>, missing: &str) -> String {
    format!("\"{}\"", value.unwrap_or(missing).replace('"', "\"\""))
}

pub fn participants_csv(rows: &[Profile]) -> String {
    let mut out = String::from("Name,Username,Email");
    for p in rows {
        out.push('\n');
        out.push_str(&quoted(p.name.as_deref(), "Unknown"));
        out.push(',');
        out.push_str(&quoted(p.username.as_deref(), "unknown"));
        out.push(',');
        out.push_str(&quoted(p.email.as_deref(), ""));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{Reply, ScriptedTransport};
    use crate::transport::Method;
    use serde_json::json;
    use std::sync::Arc;

    const EVENTS: &str = "/api/events/user/fb-g";
    const PEOPLE: &str = "/api/events/e1/registered-participants";

    fn list(t: &Arc<ScriptedTransport>) -> (RegistrationList, Notices) {
        let notices = Notices::new();
        (RegistrationList::new(t.client(), notices.clone(), "fb-g"), notices)
    }

    #[tokio::test]
    async fn own_events_come_from_the_events_key() {
        let t = ScriptedTransport::new();
        t.on(
            Method::Get,
            EVENTS,
            Reply::Json(json!({"events": [{"id": "e1", "title": "Hackathon"}]})),
        );
        let (l, _) = list(&t);
        l.load_events().await;
        assert!(matches!(l.events_panel(), Panel::Items(events) if events[0].id == "e1"));
    }

    #[tokio::test]
    async fn paging_stays_within_known_pages() {
        let t = ScriptedTransport::new();
        t.on(
            Method::Get,
            PEOPLE,
            Reply::Json(json!({
                "participants": [{"name": "Nadia"}],
                "currentPage": 0,
                "totalPages": 2,
                "totalCount": 11
            })),
        );
        let (l, _) = list(&t);
        assert!(l.participants_panel().is_none());
        assert!(!l.go_to_page(1).await);
        assert!(t.calls().is_empty());

        l.select_event("e1").await;
        assert!(l.go_to_page(1).await);
        assert!(!l.go_to_page(2).await);
        assert_eq!(t.count(Method::Get, PEOPLE), 2);
        assert_eq!(t.calls()[1].query[0], ("page".to_string(), "1".to_string()));
    }

    #[tokio::test]
    async fn switching_events_drops_the_older_page() {
        let t = ScriptedTransport::new();
        t.on(
            Method::Get,
            PEOPLE,
            Reply::Json(json!({"participants": [{"name": "Late"}], "totalPages": 1})),
        )
        .on(
            Method::Get,
            "/api/events/e2/registered-participants",
            Reply::Json(json!({"participants": [], "totalPages": 0})),
        );
        let gate = t.gate(Method::Get, PEOPLE);
        let (l, _) = list(&t);

        let slow = {
            let l = l.clone();
            tokio::spawn(async move { l.select_event("e1").await })
        };
        while t.calls().is_empty() {
            tokio::task::yield_now().await;
        }
        l.select_event("e2").await;
        gate.notify_one();
        slow.await.unwrap();

        assert_eq!(l.participants().event_id.as_deref(), Some("e2"));
        assert_eq!(l.participants_panel(), Some(Panel::Empty(NO_PARTICIPANTS.into())));
    }

    #[tokio::test]
    async fn export_needs_a_selection_and_rows() {
        let t = ScriptedTransport::new();
        t.on(
            Method::Get,
            EVENTS,
            Reply::Json(json!({"events": [{"id": "e1", "title": "Hackathon"}]})),
        )
        .once(Method::Get, PEOPLE, Reply::Json(json!({"participants": [], "totalPages": 0})))
        .once(Method::Get, PEOPLE, Reply::Json(json!({"participants": []})))
        .on(
            Method::Get,
            PEOPLE,
            Reply::Json(json!({"participants": [
                {"name": "Nadia \"N\"", "username": "nadia", "email": "n@x.org"},
                {}
            ]})),
        );
        let (l, notices) = list(&t);
        assert_eq!(l.export_csv().await, None);

        l.load_events().await;
        l.select_event("e1").await;
        assert_eq!(l.export_csv().await, None);

        let csv = l.export_csv().await.unwrap();
        assert_eq!(
            csv,
            "Name,Username,Email\n\"Nadia \"\"N\"\"\",\"nadia\",\"n@x.org\"\n\"Unknown\",\"unknown\",\"\""
        );
        assert_eq!(l.export_file_name(), "Hackathon_participants.csv");

        let messages: Vec<_> = notices.snapshot().into_iter().map(|n| n.message).collect();
        assert_eq!(
            messages,
            [
                "Please select an event first",
                "No participants to export",
                "Exported 2 participants"
            ]
        );
        assert_eq!(t.calls().last().unwrap().query[1], ("size".to_string(), "1000".to_string()));
    }
}
