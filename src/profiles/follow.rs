use serde::Serialize;

use super::dto::{CurrentUser, Profile};

/// Follow button state. Nothing is sent to the backend; the toggle only
/// changes what the page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FollowToggle {
    following: bool,
    disabled: bool,
}

impl FollowToggle {
    pub fn new(viewer: Option<&CurrentUser>, profile: &Profile) -> Self {
        let Some(viewer) = viewer else {
            return Self {
                following: false,
                disabled: true,
            };
        };
        let following = profile
            .firebase_uid
            .as_deref()
            .map(|uid| viewer.follows(uid))
            .unwrap_or(false);
        Self {
            following,
            disabled: viewer.owns(profile),
        }
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Flips the state unless disabled; returns the new state.
    pub fn toggle(&mut self) -> bool {
        if !self.disabled {
            self.following = !self.following;
        }
        self.following
    }

    pub fn label(&self) -> &'static str {
        if self.following {
            "Following"
        } else {
            "Follow"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::dto::Role;

    fn viewer(following: &[&str]) -> CurrentUser {
        CurrentUser {
            id: Some("p1".into()),
            firebase_uid: "fb-me".into(),
            role: Role::Participant,
            following: following.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn profile(uid: &str) -> Profile {
        Profile {
            firebase_uid: Some(uid.into()),
            ..Default::default()
        }
    }

    #[test]
    fn starts_from_viewer_following_list() {
        let me = viewer(&["fb-org"]);
        let t = FollowToggle::new(Some(&me), &profile("fb-org"));
        assert!(t.is_following());
        assert_eq!(t.label(), "Following");
        assert!(!FollowToggle::new(Some(&me), &profile("fb-x")).is_following());
    }

    #[test]
    fn own_profile_cannot_be_followed() {
        let me = viewer(&[]);
        let mut t = FollowToggle::new(Some(&me), &profile("fb-me"));
        assert!(t.is_disabled());
        assert!(!t.toggle());
    }

    #[test]
    fn toggle_flips_locally() {
        let me = viewer(&[]);
        let mut t = FollowToggle::new(Some(&me), &profile("fb-org"));
        assert!(t.toggle());
        assert!(!t.toggle());
    }

    #[test]
    fn anonymous_viewer_is_disabled() {
        assert!(FollowToggle::new(None, &profile("fb-org")).is_disabled());
    }
}
