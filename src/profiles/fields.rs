//! What a profile page shows for each role, and what it shows instead when
//! data is missing.

use serde::Serialize;

use super::dto::{Profile, Role};
use crate::datetime::display_raw;
use crate::events::Event;

pub const AVATAR_PLACEHOLDER: &str = "https://img.daisyui.com/images/profile/demo/2@94.webp";
pub const BANNER_PLACEHOLDER: &str = "https://static.vecteezy.com/system/resources/thumbnails/000/686/239/small_2x/bright-gradient-black-banner.jpg";
pub const GALLERY_PLACEHOLDER: &str = "https://via.placeholder.com/300x300?text=Image";

pub const NO_IMAGES: &str = "No images uploaded.";
pub const NO_ORGANIZERS: &str = "No verified organizers found.";
pub const NO_FOLLOWERS: &str = "No followers yet.";
pub const NO_FOLLOWING: &str = "Not following anyone yet.";
pub const PROFILE_NOT_FOUND: &str = "Profile not found";

const NOT_PROVIDED: &str = "Not provided";

fn present(v: Option<&str>) -> Option<&str> {
    v.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AboutField {
    pub label: &'static str,
    pub value: String,
}

impl AboutField {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }

    fn text(label: &'static str, value: Option<&str>, missing: &str) -> Self {
        Self::new(label, present(value).unwrap_or(missing))
    }
}

fn verification_status(p: &Profile) -> &'static str {
    if p.is_verified() {
        "Verified"
    } else {
        "Pending Verification"
    }
}

/// About-tab rows for a profile of `role`, in display order.
pub fn about_fields(role: Role, p: &Profile) -> Vec<AboutField> {
    let mut rows = vec![
        AboutField::text("Email", p.email.as_deref(), NOT_PROVIDED),
        AboutField::text("Name", p.name.as_deref(), NOT_PROVIDED),
        AboutField::new(
            "Username",
            present(p.username.as_deref())
                .map(|u| format!("@{u}"))
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        ),
    ];

    match role {
        Role::Admin => rows.push(AboutField::new(
            "Access Level",
            if p.is_super_admin() { "Super Admin" } else { "Admin" },
        )),
        Role::Organization => {
            rows.push(AboutField::text("Organization Type", p.kind.as_deref(), "Not specified"));
            rows.push(AboutField::new("Verification Status", verification_status(p)));
        }
        Role::Organizer => {
            rows.push(AboutField::text(
                "Organization",
                p.organization_id.as_deref(),
                "Not assigned",
            ));
            rows.push(AboutField::new("Verification Status", verification_status(p)));
        }
        Role::Participant => {}
    }

    rows.push(AboutField::new(
        "Member Since",
        display_raw(p.created_at.as_deref()).unwrap_or_else(|| "Unknown".into()),
    ));
    rows
}

pub fn avatar_url(p: &Profile) -> &str {
    present(p.profile_picture_url.as_deref())
        .or(present(p.logo_url.as_deref()))
        .unwrap_or(AVATAR_PLACEHOLDER)
}

pub fn banner_url(p: &Profile) -> &str {
    present(p.banner_url.as_deref()).unwrap_or(BANNER_PLACEHOLDER)
}

pub fn event_cover(e: &Event) -> &str {
    present(e.banner_url.as_deref())
        .or(present(e.cover_image_url.as_deref()))
        .unwrap_or(BANNER_PLACEHOLDER)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Gallery {
    Empty(&'static str),
    Images(Vec<String>),
}

pub fn gallery(p: &Profile) -> Gallery {
    if p.picture_urls.is_empty() {
        return Gallery::Empty(NO_IMAGES);
    }
    Gallery::Images(
        p.picture_urls
            .iter()
            .map(|u| present(Some(u.as_str())).unwrap_or(GALLERY_PLACEHOLDER).to_string())
            .collect(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoleBadge {
    SuperAdmin,
    Admin,
    VerifiedOrganization,
    VerifiedOrganizer,
    Organization,
    Organizer,
    Participant,
}

impl RoleBadge {
    pub fn for_profile(role: Role, p: &Profile) -> Self {
        match role {
            Role::Admin if p.is_super_admin() => RoleBadge::SuperAdmin,
            Role::Admin => RoleBadge::Admin,
            Role::Organization if p.is_verified() => RoleBadge::VerifiedOrganization,
            Role::Organization => RoleBadge::Organization,
            Role::Organizer if p.is_verified() => RoleBadge::VerifiedOrganizer,
            Role::Organizer => RoleBadge::Organizer,
            Role::Participant => RoleBadge::Participant,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoleBadge::SuperAdmin => "Super Admin",
            RoleBadge::Admin => "Admin",
            RoleBadge::VerifiedOrganization => "Verified Organization",
            RoleBadge::VerifiedOrganizer => "Verified Organizer",
            RoleBadge::Organization => "Organization",
            RoleBadge::Organizer => "Organizer",
            RoleBadge::Participant => "Participant",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(rows: &[AboutField]) -> Vec<&'static str> {
        rows.iter().map(|r| r.label).collect()
    }

    #[test]
    fn organization_about_rows() {
        let p = Profile {
            name: Some("Robotics Club".into()),
            username: Some("robo".into()),
            verified: Some(true),
            ..Default::default()
        };
        let rows = about_fields(Role::Organization, &p);
        assert_eq!(
            labels(&rows),
            [
                "Email",
                "Name",
                "Username",
                "Organization Type",
                "Verification Status",
                "Member Since"
            ]
        );
        assert_eq!(rows[0].value, "Not provided");
        assert_eq!(rows[2].value, "@robo");
        assert_eq!(rows[3].value, "Not specified");
        assert_eq!(rows[4].value, "Verified");
    }

    #[test]
    fn admin_shows_access_level() {
        let p = Profile {
            is_super_admin: Some(true),
            ..Default::default()
        };
        let rows = about_fields(Role::Admin, &p);
        assert!(rows.contains(&AboutField::new("Access Level", "Super Admin")));
    }

    #[test]
    fn missing_images_fall_back_to_placeholders() {
        let p = Profile {
            profile_picture_url: Some("".into()),
            picture_urls: vec!["https://cdn/x.jpg".into(), " ".into()],
            ..Default::default()
        };
        assert_eq!(avatar_url(&p), AVATAR_PLACEHOLDER);
        assert_eq!(banner_url(&p), BANNER_PLACEHOLDER);
        assert_eq!(
            gallery(&p),
            Gallery::Images(vec!["https://cdn/x.jpg".into(), GALLERY_PLACEHOLDER.into()])
        );
        assert_eq!(gallery(&Profile::default()), Gallery::Empty(NO_IMAGES));
    }

    #[test]
    fn event_cover_prefers_banner() {
        let mut e = Event {
            cover_image_url: Some("https://cdn/cover.jpg".into()),
            ..Default::default()
        };
        assert_eq!(event_cover(&e), "https://cdn/cover.jpg");
        e.banner_url = Some("https://cdn/banner.jpg".into());
        assert_eq!(event_cover(&e), "https://cdn/banner.jpg");
        assert_eq!(event_cover(&Event::default()), BANNER_PLACEHOLDER);
    }

    #[test]
    fn organization_logo_used_as_avatar() {
        let p = Profile {
            logo_url: Some("https://cdn/logo.png".into()),
            ..Default::default()
        };
        assert_eq!(avatar_url(&p), "https://cdn/logo.png");
    }

    #[test]
    fn badges() {
        let verified = Profile {
            verified: Some(true),
            ..Default::default()
        };
        assert_eq!(
            RoleBadge::for_profile(Role::Organizer, &verified).label(),
            "Verified Organizer"
        );
        assert_eq!(
            RoleBadge::for_profile(Role::Organization, &Profile::default()),
            RoleBadge::Organization
        );
        assert_eq!(
            RoleBadge::for_profile(Role::Participant, &verified),
            RoleBadge::Participant
        );
    }
}
