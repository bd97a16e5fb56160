use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account type, decides which fields and tabs a profile has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Organization,
    Organizer,
    Participant,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::Organization,
        Role::Organizer,
        Role::Participant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Organization => "organization",
            Role::Organizer => "organizer",
            Role::Participant => "participant",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Organization => "Organization",
            Role::Organizer => "Organizer",
            Role::Participant => "Participant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

/// Any account record. Role-specific fields are optional and keys the
/// client does not model are carried in `extra`, so a `PUT` sends back
/// everything that was loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub picture_urls: Vec<String>,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    // organization / organizer
    #[serde(default, alias = "isVerified", skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organizer_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_ids: Vec<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    // admin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_super_admin: Option<bool>,

    // participant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registered_event_ids: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn is_verified(&self) -> bool {
        self.verified.unwrap_or(false)
    }

    pub fn is_super_admin(&self) -> bool {
        self.is_super_admin.unwrap_or(false)
    }

    /// Name if set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or(self.username.as_deref())
            .unwrap_or("")
    }
}

/// Response of `GET /api/auth/{uid}` and `GET /api/auth/role/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub role: Role,
    pub user: Profile,
}

/// The signed-in account, handed to views explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Option<String>,
    pub firebase_uid: String,
    pub role: Role,
    pub following: Vec<String>,
}

impl CurrentUser {
    pub fn from_profile(role: Role, profile: &Profile) -> Option<Self> {
        Some(Self {
            id: profile.id.clone(),
            firebase_uid: profile.firebase_uid.clone()?,
            role,
            following: profile.following.clone(),
        })
    }

    pub fn owns(&self, profile: &Profile) -> bool {
        profile.firebase_uid.as_deref() == Some(self.firebase_uid.as_str())
    }

    pub fn follows(&self, firebase_uid: &str) -> bool {
        self.following.iter().any(|f| f == firebase_uid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UsernameCheck {
    #[serde(default)]
    pub exists: bool,
}
