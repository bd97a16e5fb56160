//! Co-host picker: a debounced name search across organizations and
//! organizers.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::api::decode::DirectoryPage;
use crate::api::{ApiClient, VerificationTarget};
use crate::fetch::Slot;
use crate::profiles::{Profile, Role};

pub const DIRECTORY_PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub id: String,
    pub name: String,
    pub kind: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl DirectoryEntry {
    fn new(kind: Role, p: Profile) -> Self {
        let present = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        let name = present(&p.name)
            .or_else(|| present(&p.username))
            .or_else(|| present(&p.email))
            .unwrap_or_default();
        Self {
            id: p.id.unwrap_or_default(),
            name,
            kind,
            email: p.email,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectoryState {
    pub query: String,
    pub page: u32,
    pub searching: bool,
    pub results: Vec<DirectoryEntry>,
    pub has_more: bool,
}

#[derive(Clone)]
pub struct DirectorySearch {
    api: ApiClient,
    debounce: Duration,
    state: Slot<DirectoryState>,
}

impl DirectorySearch {
    pub fn new(api: ApiClient, debounce: Duration) -> Self {
        Self {
            api,
            debounce,
            state: Slot::default(),
        }
    }

    pub fn snapshot(&self) -> DirectoryState {
        self.state.snapshot()
    }

    /// Replaces the results with the first page for `query` once typing
    /// settles. A blank query clears the results without a request.
    pub async fn search(&self, query: &str) {
        let token = self.state.begin(|s| {
            *s = DirectoryState {
                query: query.to_string(),
                ..Default::default()
            }
        });
        if query.trim().is_empty() {
            return;
        }

        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(self.debounce) => {}
        }
        if !self.state.finish(&token, |s| s.searching = true) {
            return;
        }

        let (results, has_more) = self.fetch(query, 0).await;
        self.state.finish(&token, |s| {
            s.searching = false;
            s.results = results;
            s.has_more = has_more;
        });
    }

    /// Appends the next page. Returns false when there is nothing more.
    pub async fn load_more(&self) -> bool {
        let (query, next) = self.state.with(|s| (s.query.clone(), s.page + 1));
        if !self.state.with(|s| s.has_more) || query.trim().is_empty() {
            return false;
        }

        let token = self.state.begin(|s| s.searching = true);
        let (results, has_more) = self.fetch(&query, next).await;
        self.state.finish(&token, |s| {
            s.searching = false;
            s.results.extend(results);
            s.has_more = has_more;
            s.page = next;
        })
    }

    /// Drops the results, e.g. after a co-host was picked.
    pub fn clear(&self) {
        self.state.begin(|s| *s = DirectoryState::default());
    }

    /// Both directories at once; if either fails the page is empty.
    async fn fetch(&self, query: &str, page: u32) -> (Vec<DirectoryEntry>, bool) {
        let (orgs, organizers) = tokio::join!(
            self.api
                .directory(VerificationTarget::Organization, query, page, DIRECTORY_PAGE_SIZE),
            self.api
                .directory(VerificationTarget::Organizer, query, page, DIRECTORY_PAGE_SIZE),
        );
        match (orgs, organizers) {
            (Ok(orgs), Ok(organizers)) => {
                let has_more = !orgs.last || !organizers.last;
                let results: Vec<_> = entries(Role::Organization, orgs)
                    .chain(entries(Role::Organizer, organizers))
                    .collect();
                debug!(query, page, count = results.len(), has_more, "directory page");
                (results, has_more)
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, query, "directory search failed");
                (Vec::new(), false)
            }
        }
    }
}

fn entries(kind: Role, page: DirectoryPage) -> impl Iterator<Item = DirectoryEntry> {
    page.items.into_iter().map(move |p| DirectoryEntry::new(kind, p))
}
