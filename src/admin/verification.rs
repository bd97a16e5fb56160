use futures::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, VerificationTarget};
use crate::error::ApiError;
use crate::fetch::Slot;
use crate::notices::Notices;
use crate::profiles::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn verb(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }

    fn past(&self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }
}

fn title(target: VerificationTarget) -> &'static str {
    match target {
        VerificationTarget::Organization => "Organization",
        VerificationTarget::Organizer => "Organizer",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueueState {
    pub loading: bool,
    pub items: Vec<Profile>,
    /// Selected ids in selection order.
    pub selected: Vec<String>,
}

impl QueueState {
    pub fn all_selected(&self) -> bool {
        !self.items.is_empty() && self.selected.len() == self.items.len()
    }
}

/// Admin list of accounts awaiting verification.
#[derive(Clone)]
pub struct VerificationQueue {
    api: ApiClient,
    notices: Notices,
    target: VerificationTarget,
    state: Slot<QueueState>,
}

impl VerificationQueue {
    pub fn new(api: ApiClient, notices: Notices, target: VerificationTarget) -> Self {
        Self {
            api,
            notices,
            target,
            state: Slot::default(),
        }
    }

    pub fn target(&self) -> VerificationTarget {
        self.target
    }

    pub fn snapshot(&self) -> QueueState {
        self.state.snapshot()
    }

    pub fn empty_message(&self) -> String {
        format!("No unverified {}s found", self.target)
    }

    #[instrument(skip(self), fields(target = %self.target))]
    pub async fn load(&self) {
        let token = self.state.begin(|s| s.loading = true);
        let result = self.api.unverified(self.target).await;
        let failed = match result {
            Ok(items) => {
                let count = items.len();
                let applied = self.state.finish(&token, |s| {
                    s.loading = false;
                    s.selected
                        .retain(|id| items.iter().any(|p| p.id.as_deref() == Some(id.as_str())));
                    s.items = items;
                });
                if applied {
                    info!(count, "verification queue loaded");
                }
                None
            }
            Err(e) => self
                .state
                .finish(&token, |s| s.loading = false)
                .then_some(e),
        };
        if let Some(e) = failed {
            warn!(error = %e, "verification queue load failed");
            self.notices
                .error(format!("Failed to fetch {}s", self.target));
        }
    }

    pub fn toggle_select(&self, id: &str) {
        self.state.update(|s| {
            if let Some(pos) = s.selected.iter().position(|x| x == id) {
                s.selected.remove(pos);
            } else if s.items.iter().any(|p| p.id.as_deref() == Some(id)) {
                s.selected.push(id.to_string());
            }
        });
    }

    pub fn select_all(&self, on: bool) {
        self.state.update(|s| {
            s.selected = if on {
                s.items.iter().filter_map(|p| p.id.clone()).collect()
            } else {
                Vec::new()
            };
        });
    }

    async fn decide(&self, decision: Decision, id: &str) -> Result<(), ApiError> {
        match decision {
            Decision::Approve => self.api.approve(self.target, id).await,
            Decision::Reject => self.api.reject(self.target, id).await,
        }
    }

    async fn single(&self, decision: Decision, id: &str) -> bool {
        match self.decide(decision, id).await {
            Ok(()) => {
                self.notices.success(format!(
                    "{} {} successfully",
                    title(self.target),
                    decision.past()
                ));
                self.load().await;
                true
            }
            Err(e) => {
                warn!(error = %e, %id, decision = decision.verb(), "verification action failed");
                self.notices
                    .error(format!("Failed to {} {}", decision.verb(), self.target));
                false
            }
        }
    }

    pub async fn approve(&self, id: &str) -> bool {
        self.single(Decision::Approve, id).await
    }

    /// Rejection deletes the account server-side.
    pub async fn reject(&self, id: &str) -> bool {
        self.single(Decision::Reject, id).await
    }

    /// Runs `decision` for every selected id at once. The batch counts as
    /// failed if any call fails: one error notice is raised and the list is
    /// left untouched. On success the ids leave the list.
    async fn bulk(&self, decision: Decision) -> bool {
        let ids = self.state.with(|s| s.selected.clone());
        if ids.is_empty() {
            return false;
        }

        let results = join_all(ids.iter().map(|id| self.decide(decision, id))).await;
        let failures: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        if let Some(first) = failures.first() {
            warn!(
                error = %first,
                failed = failures.len(),
                total = ids.len(),
                decision = decision.verb(),
                "bulk verification failed"
            );
            self.notices.error(format!(
                "Failed to {} selected {}s",
                decision.verb(),
                self.target
            ));
            return false;
        }

        self.state.update(|s| {
            s.items
                .retain(|p| !p.id.as_ref().is_some_and(|id| ids.contains(id)));
            s.selected.clear();
        });
        info!(count = ids.len(), decision = decision.verb(), "bulk verification done");
        self.notices.success(format!(
            "{} {}(s) {} successfully",
            ids.len(),
            self.target,
            decision.past()
        ));
        true
    }

    pub async fn approve_selected(&self) -> bool {
        self.bulk(Decision::Approve).await
    }

    pub async fn reject_selected(&self) -> bool {
        self.bulk(Decision::Reject).await
    }
}
