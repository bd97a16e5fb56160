use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use super::dto::{Profile, Role};
use crate::api::ApiClient;
use crate::error::{ApiError, ViewError};
use crate::fetch::Slot;
use crate::notices::Notices;

const FETCH_FAILED: &str = "Failed to fetch profile data";
const USERNAME_TAKEN: &str = "Username already taken";

/// A loaded profile: the last saved copy and the editable draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedProfile {
    pub role: Role,
    pub firebase_uid: String,
    pub saved: Profile,
    pub draft: Profile,
}

impl LoadedProfile {
    pub fn is_dirty(&self) -> bool {
        self.saved != self.draft
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "screen", content = "profile", rename_all = "snake_case")]
pub enum ProfileScreen {
    Idle,
    Loading,
    NotFound,
    Ready(LoadedProfile),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsernameStatus {
    pub checking: bool,
    pub taken: bool,
    pub message: Option<String>,
    /// The candidate the current result is about.
    pub checked: Option<String>,
}

impl UsernameStatus {
    fn rejects(&self, username: Option<&str>) -> bool {
        self.taken && self.checked.as_deref() == username.map(str::trim)
    }
}

#[derive(Debug, Default)]
struct LoaderState {
    loading: bool,
    /// Uid of the latest load; `None` until the first one.
    requested: Option<String>,
    current: Option<LoadedProfile>,
}

impl LoaderState {
    /// The stored profile, but only when it belongs to the latest request.
    /// A failed load for another uid keeps the stored copy without showing it.
    fn shown(&self) -> Option<&LoadedProfile> {
        self.current
            .as_ref()
            .filter(|c| self.requested.as_deref() == Some(c.firebase_uid.as_str()))
    }

    fn shown_mut(&mut self) -> Option<&mut LoadedProfile> {
        let requested = self.requested.as_deref();
        self.current
            .as_mut()
            .filter(|c| requested == Some(c.firebase_uid.as_str()))
    }
}

/// Loads one profile by (role, uid) or by uid alone and tracks its draft.
/// A newer load supersedes an older one. A failed reload of the same uid
/// keeps it on screen; a failed load of another uid shows not found.
#[derive(Clone)]
pub struct ProfileLoader {
    api: ApiClient,
    notices: Notices,
    debounce: Duration,
    state: Slot<LoaderState>,
    username: Slot<UsernameStatus>,
}

impl ProfileLoader {
    pub fn new(api: ApiClient, notices: Notices, debounce: Duration) -> Self {
        Self {
            api,
            notices,
            debounce,
            state: Slot::default(),
            username: Slot::default(),
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&self, role: Role, firebase_uid: &str) {
        let token = self.begin(firebase_uid);
        let result = self.api.profile(role, firebase_uid).await.map(|p| (role, p));
        self.apply(&token, firebase_uid, result);
    }

    /// Role-agnostic load used by the public profile page.
    #[instrument(skip(self))]
    pub async fn load_public(&self, firebase_uid: &str) {
        let token = self.begin(firebase_uid);
        let result = self
            .api
            .public_profile(firebase_uid)
            .await
            .map(|p| (p.role, p.user));
        self.apply(&token, firebase_uid, result);
    }

    fn begin(&self, firebase_uid: &str) -> CancellationToken {
        self.username.begin(|u| *u = UsernameStatus::default());
        self.state.begin(|s| {
            s.loading = true;
            s.requested = Some(firebase_uid.to_string());
        })
    }

    fn apply(
        &self,
        token: &CancellationToken,
        firebase_uid: &str,
        result: Result<(Role, Profile), ApiError>,
    ) {
        match result {
            Ok((role, profile)) => {
                let applied = self.state.finish(token, |s| {
                    s.loading = false;
                    s.current = Some(LoadedProfile {
                        role,
                        firebase_uid: firebase_uid.to_string(),
                        saved: profile.clone(),
                        draft: profile,
                    });
                });
                if applied {
                    info!(%role, firebase_uid, "profile loaded");
                }
            }
            Err(e) => {
                let applied = self.state.finish(token, |s| s.loading = false);
                if applied {
                    warn!(error = %e, firebase_uid, "profile load failed");
                    self.notices.error(FETCH_FAILED);
                }
            }
        }
    }

    /// Drops any in-flight load and username check, e.g. when the page closes.
    pub fn cancel(&self) {
        self.state.cancel();
        self.username.cancel();
    }

    pub fn screen(&self) -> ProfileScreen {
        self.state.with(|s| {
            if s.loading {
                ProfileScreen::Loading
            } else if let Some(c) = s.shown() {
                ProfileScreen::Ready(c.clone())
            } else if s.requested.is_some() {
                ProfileScreen::NotFound
            } else {
                ProfileScreen::Idle
            }
        })
    }

    pub fn current(&self) -> Option<LoadedProfile> {
        self.state.with(|s| s.shown().cloned())
    }

    pub fn username_status(&self) -> UsernameStatus {
        self.username.snapshot()
    }

    /// Applies `f` to the draft.
    pub fn draft_mut<R>(&self, f: impl FnOnce(&mut Profile) -> R) -> Result<R, ViewError> {
        self.state.update(|s| {
            s.shown_mut()
                .map(|c| f(&mut c.draft))
                .ok_or(ViewError::NothingLoaded)
        })
    }

    pub fn cancel_edit(&self) -> Result<(), ViewError> {
        self.username.begin(|u| *u = UsernameStatus::default());
        self.state.update(|s| {
            let c = s.shown_mut().ok_or(ViewError::NothingLoaded)?;
            c.draft = c.saved.clone();
            Ok(())
        })
    }

    /// Appends already-uploaded image urls to the draft gallery.
    pub fn add_gallery_images(&self, urls: Vec<String>) -> Result<(), ViewError> {
        let n = urls.len();
        self.draft_mut(|d| d.picture_urls.extend(urls))?;
        self.notices
            .success(format!("{n} image(s) added to gallery (not saved yet)"));
        Ok(())
    }

    pub fn remove_gallery_image(&self, index: usize) -> Result<bool, ViewError> {
        let removed = self.draft_mut(|d| {
            (index < d.picture_urls.len())
                .then(|| d.picture_urls.remove(index))
                .is_some()
        })?;
        if removed {
            self.notices.success("Image removed from gallery (not saved yet)");
        }
        Ok(removed)
    }

    /// Debounced availability check for the draft username. A newer call
    /// supersedes an older one that is still waiting or in flight. The
    /// saved username and an empty one are never reported as taken.
    pub async fn check_username(&self, candidate: &str) {
        let token = self.username.begin(|u| {
            *u = UsernameStatus {
                checking: true,
                ..Default::default()
            }
        });

        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(self.debounce) => {}
        }

        let candidate = candidate.trim();
        let saved = self
            .state
            .with(|s| s.shown().and_then(|c| c.saved.username.clone()));
        let (taken, message) = if candidate.is_empty() || saved.as_deref() == Some(candidate) {
            (false, None)
        } else {
            match self.api.username_taken(candidate).await {
                Ok(true) => (true, Some(USERNAME_TAKEN.to_string())),
                Ok(false) => (false, None),
                Err(e) => {
                    warn!(error = %e, "username check failed");
                    (false, Some("Error checking username availability".to_string()))
                }
            }
        };

        self.username.finish(&token, |u| {
            *u = UsernameStatus {
                checking: false,
                taken,
                message,
                checked: Some(candidate.to_string()),
            }
        });
    }

    /// Sends the whole draft back. On success the response becomes the
    /// saved copy; on failure the draft is left for another try.
    #[instrument(skip(self))]
    pub async fn save(&self) -> Result<Profile, ViewError> {
        let (role, firebase_uid, draft) = self
            .state
            .with(|s| {
                s.shown()
                    .map(|c| (c.role, c.firebase_uid.clone(), c.draft.clone()))
            })
            .ok_or(ViewError::NothingLoaded)?;

        if self.username.with(|u| u.rejects(draft.username.as_deref())) {
            self.notices.error(USERNAME_TAKEN);
            return Err(ViewError::UsernameRejected(USERNAME_TAKEN.into()));
        }

        match self.api.update_profile(role, &firebase_uid, &draft).await {
            Ok(saved) => {
                self.state.update(|s| {
                    if let Some(c) = s.current.as_mut().filter(|c| c.firebase_uid == firebase_uid) {
                        // keep edits made while the request was in flight
                        if c.draft == draft {
                            c.draft = saved.clone();
                        }
                        c.saved = saved.clone();
                    }
                });
                info!(%role, firebase_uid = %firebase_uid, "profile saved");
                self.notices.success("Profile updated successfully");
                Ok(saved)
            }
            Err(e) => {
                error!(error = %e, %role, firebase_uid = %firebase_uid, "profile save failed");
                self.notices.error("Failed to update profile");
                Err(e.into())
            }
        }
    }
}
