use serde::Serialize;

pub const MAX_PLATFORM_ID_LEN: usize = 32;

/// Social platforms a link can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Twitter,
    Instagram,
    Facebook,
    LinkedIn,
    GitHub,
    YouTube,
    TikTok,
    Dribbble,
    Behance,
    Medium,
    Pinterest,
    Snapchat,
    Twitch,
    Discord,
    Reddit,
    WhatsApp,
    Telegram,
    Email,
    Website,
    Other,
}

/// Icons the front end knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Twitter,
    Instagram,
    Facebook,
    Linkedin,
    Github,
    Youtube,
    Music,
    Dribbble,
    Figma,
    MessageCircle,
    Twitch,
    Phone,
    Mail,
    Globe,
}

impl Platform {
    pub const ALL: [Platform; 20] = [
        Platform::Twitter,
        Platform::Instagram,
        Platform::Facebook,
        Platform::LinkedIn,
        Platform::GitHub,
        Platform::YouTube,
        Platform::TikTok,
        Platform::Dribbble,
        Platform::Behance,
        Platform::Medium,
        Platform::Pinterest,
        Platform::Snapchat,
        Platform::Twitch,
        Platform::Discord,
        Platform::Reddit,
        Platform::WhatsApp,
        Platform::Telegram,
        Platform::Email,
        Platform::Website,
        Platform::Other,
    ];

    /// Exact match on the stored identifier.
    pub fn from_id(value: &str) -> Option<Self> {
        let platform = match value {
            "twitter" => Self::Twitter,
            "instagram" => Self::Instagram,
            "facebook" => Self::Facebook,
            "linkedin" => Self::LinkedIn,
            "github" => Self::GitHub,
            "youtube" => Self::YouTube,
            "tiktok" => Self::TikTok,
            "dribbble" => Self::Dribbble,
            "behance" => Self::Behance,
            "medium" => Self::Medium,
            "pinterest" => Self::Pinterest,
            "snapchat" => Self::Snapchat,
            "twitch" => Self::Twitch,
            "discord" => Self::Discord,
            "reddit" => Self::Reddit,
            "whatsapp" => Self::WhatsApp,
            "telegram" => Self::Telegram,
            "email" => Self::Email,
            "website" => Self::Website,
            "other" => Self::Other,
            _ => return None,
        };
        Some(platform)
    }

    /// Lenient parse for user input: trims and lowercases first.
    pub fn normalize(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_PLATFORM_ID_LEN {
            return None;
        }
        Self::from_id(&trimmed.to_ascii_lowercase())
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::LinkedIn => "linkedin",
            Self::GitHub => "github",
            Self::YouTube => "youtube",
            Self::TikTok => "tiktok",
            Self::Dribbble => "dribbble",
            Self::Behance => "behance",
            Self::Medium => "medium",
            Self::Pinterest => "pinterest",
            Self::Snapchat => "snapchat",
            Self::Twitch => "twitch",
            Self::Discord => "discord",
            Self::Reddit => "reddit",
            Self::WhatsApp => "whatsapp",
            Self::Telegram => "telegram",
            Self::Email => "email",
            Self::Website => "website",
            Self::Other => "other",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Twitter => "Twitter",
            Self::Instagram => "Instagram",
            Self::Facebook => "Facebook",
            Self::LinkedIn => "LinkedIn",
            Self::GitHub => "GitHub",
            Self::YouTube => "YouTube",
            Self::TikTok => "TikTok",
            Self::Dribbble => "Dribbble",
            Self::Behance => "Behance",
            Self::Medium => "Medium",
            Self::Pinterest => "Pinterest",
            Self::Snapchat => "Snapchat",
            Self::Twitch => "Twitch",
            Self::Discord => "Discord",
            Self::Reddit => "Reddit",
            Self::WhatsApp => "WhatsApp",
            Self::Telegram => "Telegram",
            Self::Email => "Email",
            Self::Website => "Website",
            Self::Other => "Other",
        }
    }

    pub const fn icon(self) -> Icon {
        match self {
            Self::Twitter => Icon::Twitter,
            Self::Instagram => Icon::Instagram,
            Self::Facebook => Icon::Facebook,
            Self::LinkedIn => Icon::Linkedin,
            Self::GitHub => Icon::Github,
            Self::YouTube => Icon::Youtube,
            Self::TikTok => Icon::Music,
            Self::Dribbble => Icon::Dribbble,
            Self::Behance => Icon::Figma,
            Self::Medium | Self::Discord | Self::Telegram => Icon::MessageCircle,
            Self::Twitch => Icon::Twitch,
            Self::WhatsApp => Icon::Phone,
            Self::Email => Icon::Mail,
            Self::Pinterest | Self::Snapchat | Self::Reddit | Self::Website | Self::Other => {
                Icon::Globe
            }
        }
    }
}

/// Icon for a stored platform string. Unknown values get the globe.
pub fn icon_for(platform: &str) -> Icon {
    match Platform::from_id(platform) {
        Some(known) => known.icon(),
        None => Icon::Globe,
    }
}

/// Label shown under a social icon.
pub fn label_for(platform: &str, display_name: Option<&str>) -> String {
    if let Some(name) = display_name.map(str::trim).filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    match Platform::from_id(platform) {
        Some(known) => known.display_name().to_string(),
        None => platform.to_string(),
    }
}

/// Social icon grid width for a given number of links.
///
/// The banding is layout tuning rather than a formula: 4 and 7+ links
/// get four columns, everything else three.
pub const fn social_grid_columns(link_count: usize) -> u8 {
    match link_count {
        0..=3 => 3,
        4 => 4,
        5 | 6 => 3,
        _ => 4,
    }
}
