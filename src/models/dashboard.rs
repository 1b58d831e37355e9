use serde::{Deserialize, Serialize};

use crate::models::profile::{CustomLink, ProfileFields, SocialLink};
use crate::platform::{Icon, Platform};

/// Dashboard operations that carry their own loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    UpdateProfile,
    UploadAvatar,
    AddSocialLink,
    AddCustomLink,
    DeleteSocialLink,
    DeleteCustomLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeView {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialLinkEntry {
    #[serde(flatten)]
    pub link: SocialLink,
    pub platform_name: String,
    pub icon: Icon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformOption {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: Icon,
}

impl PlatformOption {
    pub fn all() -> Vec<Self> {
        Platform::ALL
            .iter()
            .map(|platform| Self {
                id: platform.id(),
                name: platform.display_name(),
                icon: platform.icon(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub profile: ProfileFields,
    pub profile_url: String,
    pub social_links: Vec<SocialLinkEntry>,
    pub custom_links: Vec<CustomLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<NoticeView>,
    pub loading: Vec<Operation>,
    pub platforms: Vec<PlatformOption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddSocialLinkRequest {
    pub platform: String,
    pub url: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddCustomLinkRequest {
    pub title: String,
    pub url: String,
}
