use std::str::FromStr;

use serde::Serialize;

use super::dto::Role;
use crate::error::ViewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    About,
    Gallery,
    Events,
    Registered,
    Organizers,
    Followers,
    Following,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::About => "about",
            Tab::Gallery => "gallery",
            Tab::Events => "events",
            Tab::Registered => "registered",
            Tab::Organizers => "organizers",
            Tab::Followers => "followers",
            Tab::Following => "following",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::About => "About",
            Tab::Gallery => "Gallery",
            Tab::Events => "Events",
            Tab::Registered => "Registered Events",
            Tab::Organizers => "Organizers",
            Tab::Followers => "Followers",
            Tab::Following => "Following",
        }
    }

    /// Tabs that list events and therefore carry a running/past sub-tab.
    pub fn lists_events(&self) -> bool {
        matches!(self, Tab::Events | Tab::Registered)
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Tab::About,
            Tab::Gallery,
            Tab::Events,
            Tab::Registered,
            Tab::Organizers,
            Tab::Followers,
            Tab::Following,
        ]
        .into_iter()
        .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| format!("unknown tab: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubTab {
    Running,
    Past,
}

impl SubTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubTab::Running => "running",
            SubTab::Past => "past",
        }
    }
}

const ADMIN_TABS: &[Tab] = &[Tab::About, Tab::Followers, Tab::Following];
const ORGANIZATION_TABS: &[Tab] = &[
    Tab::About,
    Tab::Gallery,
    Tab::Events,
    Tab::Organizers,
    Tab::Followers,
    Tab::Following,
];
const ORGANIZER_TABS: &[Tab] = &[
    Tab::About,
    Tab::Gallery,
    Tab::Events,
    Tab::Followers,
    Tab::Following,
];
const PARTICIPANT_TABS: &[Tab] = &[
    Tab::About,
    Tab::Gallery,
    Tab::Registered,
    Tab::Followers,
    Tab::Following,
];

/// Tabs a profile of `role` shows, in display order.
pub fn tabs_for(role: Role) -> &'static [Tab] {
    match role {
        Role::Admin => ADMIN_TABS,
        Role::Organization => ORGANIZATION_TABS,
        Role::Organizer => ORGANIZER_TABS,
        Role::Participant => PARTICIPANT_TABS,
    }
}

/// Selected tab and, while an event tab is open, the running/past sub-tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabController {
    role: Role,
    tab: Tab,
    sub: Option<SubTab>,
}

impl TabController {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            tab: tabs_for(role)[0],
            sub: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn tabs(&self) -> &'static [Tab] {
        tabs_for(self.role)
    }

    pub fn current(&self) -> Tab {
        self.tab
    }

    pub fn sub_tab(&self) -> Option<SubTab> {
        self.sub
    }

    pub fn allows(&self, tab: Tab) -> bool {
        self.tabs().contains(&tab)
    }

    /// Returns `Ok(true)` when the tab actually changed.
    pub fn select(&mut self, tab: Tab) -> Result<bool, ViewError> {
        if !self.allows(tab) {
            return Err(ViewError::TabUnavailable {
                tab: tab.as_str().into(),
                role: self.role.as_str().into(),
            });
        }
        if tab == self.tab {
            return Ok(false);
        }
        self.tab = tab;
        self.sub = tab.lists_events().then_some(SubTab::Running);
        Ok(true)
    }

    /// Ignored unless an event tab is open.
    pub fn select_sub(&mut self, sub: SubTab) -> bool {
        match self.sub {
            Some(_) => {
                self.sub = Some(sub);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_starts_on_about() {
        for role in Role::ALL {
            let c = TabController::new(role);
            assert_eq!(c.current(), Tab::About);
            assert_eq!(c.sub_tab(), None);
        }
    }

    #[test]
    fn role_tab_sets() {
        assert_eq!(
            tabs_for(Role::Admin),
            &[Tab::About, Tab::Followers, Tab::Following]
        );
        assert!(tabs_for(Role::Organization).contains(&Tab::Organizers));
        assert!(!tabs_for(Role::Organizer).contains(&Tab::Organizers));
        assert!(tabs_for(Role::Participant).contains(&Tab::Registered));
        assert!(!tabs_for(Role::Participant).contains(&Tab::Events));
    }

    #[test]
    fn tab_names_parse() {
        assert_eq!("Organizers".parse::<Tab>(), Ok(Tab::Organizers));
        assert!("settings".parse::<Tab>().is_err());
    }

    #[test]
    fn illegal_tab_is_rejected_and_state_kept() {
        let mut c = TabController::new(Role::Admin);
        let err = c.select(Tab::Gallery).unwrap_err();
        assert_eq!(
            err,
            ViewError::TabUnavailable {
                tab: "gallery".into(),
                role: "admin".into()
            }
        );
        assert_eq!(c.current(), Tab::About);
    }

    #[test]
    fn sub_tab_lives_only_inside_event_tabs() {
        let mut c = TabController::new(Role::Organization);
        assert!(!c.select_sub(SubTab::Past));

        assert_eq!(c.select(Tab::Events), Ok(true));
        assert_eq!(c.sub_tab(), Some(SubTab::Running));
        assert!(c.select_sub(SubTab::Past));
        assert_eq!(c.sub_tab(), Some(SubTab::Past));

        assert_eq!(c.select(Tab::Events), Ok(false));
        assert_eq!(c.sub_tab(), Some(SubTab::Past));

        c.select(Tab::Gallery).unwrap();
        assert_eq!(c.sub_tab(), None);
        c.select(Tab::Events).unwrap();
        assert_eq!(c.sub_tab(), Some(SubTab::Running));
    }
}
