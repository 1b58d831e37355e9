use serde::Serialize;
use uuid::Uuid;

use crate::platform::Icon;

/// Render-ready public profile. Absent optional fields are omitted entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicProfileView {
    pub profile_id: Uuid,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub avatar_url: String,
    pub has_avatar: bool,
    pub social_grid_columns: u8,
    pub social_links: Vec<SocialIconView>,
    pub custom_links: Vec<CustomLinkView>,
    pub contact_cards: Vec<ContactCard>,
    pub footer: FooterView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialIconView {
    pub platform: String,
    pub label: String,
    pub url: String,
    pub icon: Icon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomLinkView {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Email,
    Phone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactCard {
    pub kind: ContactKind,
    pub value: String,
    pub href: String,
    pub action_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterView {
    pub powered_by: String,
    pub create_profile_href: &'static str,
}

/// Body of the 404 page for unknown usernames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFoundPage {
    pub title: &'static str,
    pub message: &'static str,
    pub home_href: &'static str,
}

impl Default for NotFoundPage {
    fn default() -> Self {
        Self {
            title: "Profile Not Found",
            message: "The profile you're looking for doesn't exist or may have been removed.",
            home_href: "/",
        }
    }
}
