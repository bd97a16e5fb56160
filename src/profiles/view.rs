use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

use super::dto::{CurrentUser, Profile, PublicProfile, Role};
use super::fields::{
    about_fields, gallery, AboutField, Gallery, RoleBadge, NO_FOLLOWERS, NO_FOLLOWING,
    NO_ORGANIZERS,
};
use super::follow::FollowToggle;
use super::services::fetch_organizers;
use super::tabs::{SubTab, Tab, TabController};
use crate::api::ApiClient;
use crate::error::ViewError;
use crate::events::{fetch_events_by_ids, partition, Event, EventPartition};
use crate::fetch::{Remote, Slot};

/// Contents of a list area: still loading, an empty-state message, or items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Panel<T> {
    Loading,
    Empty(String),
    Items(T),
}

impl<T> Panel<T> {
    pub(crate) fn of(items: T, is_empty: bool, empty: impl Into<String>) -> Self {
        if is_empty {
            Panel::Empty(empty.into())
        } else {
            Panel::Items(items)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tab", rename_all = "snake_case")]
pub enum TabContent {
    About { fields: Vec<AboutField> },
    Gallery { gallery: Gallery },
    Events { sub: SubTab, panel: Panel<Vec<Event>> },
    Organizers { panel: Panel<Vec<Profile>> },
    People { panel: Panel<Vec<String>> },
}

/// One profile page for any role. Tab data is fetched when its tab is
/// entered and dropped when the tab is left; nothing is cached between
/// visits.
pub struct RoleProfileView {
    api: ApiClient,
    role: Role,
    profile: Profile,
    tabs: TabController,
    events: Slot<Remote<EventPartition>>,
    organizers: Slot<Remote<Vec<Profile>>>,
    follow: FollowToggle,
}

impl RoleProfileView {
    pub fn new(api: ApiClient, role: Role, profile: Profile, viewer: Option<&CurrentUser>) -> Self {
        Self {
            follow: FollowToggle::new(viewer, &profile),
            tabs: TabController::new(role),
            api,
            role,
            profile,
            events: Slot::default(),
            organizers: Slot::default(),
        }
    }

    pub fn from_public(api: ApiClient, public: PublicProfile, viewer: Option<&CurrentUser>) -> Self {
        Self::new(api, public.role, public.user, viewer)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn tabs(&self) -> &'static [Tab] {
        self.tabs.tabs()
    }

    pub fn current_tab(&self) -> Tab {
        self.tabs.current()
    }

    pub fn sub_tab(&self) -> Option<SubTab> {
        self.tabs.sub_tab()
    }

    pub fn badge(&self) -> RoleBadge {
        RoleBadge::for_profile(self.role, &self.profile)
    }

    pub fn follow(&self) -> FollowToggle {
        self.follow
    }

    pub fn toggle_follow(&mut self) -> bool {
        self.follow.toggle()
    }

    /// Switches tab. Entering a tab that lists remote data starts its load
    /// and returns the task handle; re-selecting the current tab does
    /// nothing.
    pub fn select_tab(&mut self, tab: Tab) -> Result<Option<JoinHandle<()>>, ViewError> {
        let previous = self.tabs.current();
        if !self.tabs.select(tab)? {
            return Ok(None);
        }
        self.leave(previous);
        debug!(from = previous.as_str(), to = tab.as_str(), "tab changed");
        Ok(self.enter(tab))
    }

    pub fn select_sub_tab(&mut self, sub: SubTab) -> bool {
        self.tabs.select_sub(sub)
    }

    fn leave(&self, tab: Tab) {
        fn reset<T>(slot: &Slot<Remote<T>>) {
            slot.cancel();
            slot.update(|s| {
                if s.is_loading() {
                    *s = Remote::Idle;
                }
            });
        }
        match tab {
            Tab::Events | Tab::Registered => reset(&self.events),
            Tab::Organizers => reset(&self.organizers),
            _ => {}
        }
    }

    fn enter(&self, tab: Tab) -> Option<JoinHandle<()>> {
        let api = self.api.clone();
        match tab {
            Tab::Events | Tab::Registered => {
                let ids = if tab == Tab::Events {
                    self.profile.event_ids.clone()
                } else {
                    self.profile.registered_event_ids.clone()
                };
                let slot = self.events.clone();
                let token = slot.begin_loading();
                Some(tokio::spawn(async move {
                    let events = fetch_events_by_ids(&api, &ids, &token).await;
                    slot.complete(&token, Remote::Ready(partition(events)));
                }))
            }
            Tab::Organizers => {
                let profile = self.profile.clone();
                let slot = self.organizers.clone();
                let token = slot.begin_loading();
                Some(tokio::spawn(async move {
                    let list = fetch_organizers(&api, &profile, &token).await;
                    slot.complete(&token, Remote::Ready(list));
                }))
            }
            _ => None,
        }
    }

    /// What the current tab shows right now.
    pub fn content(&self) -> TabContent {
        match self.tabs.current() {
            Tab::About => TabContent::About {
                fields: about_fields(self.role, &self.profile),
            },
            Tab::Gallery => TabContent::Gallery {
                gallery: gallery(&self.profile),
            },
            Tab::Events | Tab::Registered => {
                let sub = self.tabs.sub_tab().unwrap_or(SubTab::Running);
                let panel = self.events.with(|s| match s {
                    Remote::Idle | Remote::Loading => Panel::Loading,
                    Remote::Failed(_) => Panel::Empty(EventPartition::empty_message(sub)),
                    Remote::Ready(p) => {
                        let side = p.side(sub);
                        Panel::of(side.to_vec(), side.is_empty(), EventPartition::empty_message(sub))
                    }
                });
                TabContent::Events { sub, panel }
            }
            Tab::Organizers => {
                let panel = self.organizers.with(|s| match s {
                    Remote::Idle | Remote::Loading => Panel::Loading,
                    Remote::Failed(_) => Panel::Empty(NO_ORGANIZERS.into()),
                    Remote::Ready(list) => Panel::of(list.clone(), list.is_empty(), NO_ORGANIZERS),
                });
                TabContent::Organizers { panel }
            }
            Tab::Followers => TabContent::People {
                panel: Panel::of(
                    self.profile.followers.clone(),
                    self.profile.followers.is_empty(),
                    NO_FOLLOWERS,
                ),
            },
            Tab::Following => TabContent::People {
                panel: Panel::of(
                    self.profile.following.clone(),
                    self.profile.following.is_empty(),
                    NO_FOLLOWING,
                ),
            },
        }
    }
}

impl Drop for RoleProfileView {
    fn drop(&mut self) {
        self.events.cancel();
        self.organizers.cancel();
    }
}
