use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::events::Event;
use crate::fetch::{Remote, Slot};
use crate::notices::Notices;
use crate::profiles::Panel;

pub const NO_PAST_EVENTS: &str = "No Past Events";
const FETCH_FAILED: &str = "Failed to fetch past events";

/// A participant's attended events.
#[derive(Clone)]
pub struct PastEvents {
    api: ApiClient,
    notices: Notices,
    firebase_uid: String,
    state: Slot<Remote<Vec<Event>>>,
}

impl PastEvents {
    pub fn new(api: ApiClient, notices: Notices, firebase_uid: impl Into<String>) -> Self {
        Self {
            api,
            notices,
            firebase_uid: firebase_uid.into(),
            state: Slot::default(),
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&self) {
        let token = self.state.begin_loading();
        match self.api.past_events(&self.firebase_uid).await {
            Ok(events) => {
                let count = events.len();
                if self.state.complete(&token, Remote::Ready(events)) {
                    info!(count, firebase_uid = %self.firebase_uid, "past events loaded");
                }
            }
            Err(e) => {
                if self.state.complete(&token, Remote::Failed(FETCH_FAILED.into())) {
                    warn!(error = %e, firebase_uid = %self.firebase_uid, "past events failed");
                    self.notices.error(FETCH_FAILED);
                }
            }
        }
    }

    pub fn cancel(&self) {
        self.state.cancel();
    }

    pub fn snapshot(&self) -> Remote<Vec<Event>> {
        self.state.snapshot()
    }

    pub fn panel(&self) -> Panel<Vec<Event>> {
        self.state.with(|s| match s {
            Remote::Idle | Remote::Loading => Panel::Loading,
            Remote::Failed(_) => Panel::Empty(NO_PAST_EVENTS.into()),
            Remote::Ready(events) => Panel::of(events.clone(), events.is_empty(), NO_PAST_EVENTS),
        })
    }
}
