use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub platform: String,
    pub url: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSocialLink {
    pub platform: String,
    pub url: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomLink {
    pub title: String,
    pub url: String,
}

/// A profile with both link collections, each ordered by creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileBundle {
    pub profile: Profile,
    pub social_links: Vec<SocialLink>,
    pub custom_links: Vec<CustomLink>,
}

/// What the dashboard starts from. The profile row may not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerState {
    pub profile: Option<Profile>,
    pub social_links: Vec<SocialLink>,
    pub custom_links: Vec<CustomLink>,
}

/// First path segments owned by fixed routes; a profile there would be unreachable.
pub const RESERVED_USERNAMES: [&str; 5] = ["auth", "dashboard", "health", "storage", "user"];

/// Owner-editable profile fields. Empty strings stand for "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileFields {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub location: String,
    pub phone: String,
    pub email: String,
    pub avatar_url: String,
}

impl ProfileFields {
    pub fn from_profile(profile: &Profile) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            username: text(&profile.username),
            first_name: text(&profile.first_name),
            last_name: text(&profile.last_name),
            bio: text(&profile.bio),
            location: text(&profile.location),
            phone: text(&profile.phone),
            email: text(&profile.email),
            avatar_url: text(&profile.avatar_url),
        }
    }

    pub fn has_reserved_username(&self) -> bool {
        let trimmed = self.username.trim();
        RESERVED_USERNAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(trimmed))
    }

    /// Username as persisted: blank maps to NULL so the unique index holds.
    pub fn stored_username(&self) -> Option<String> {
        let trimmed = self.username.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Non-empty content of an optional text column.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}
