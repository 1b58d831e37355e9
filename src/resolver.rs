//! Username → public profile view.
//!
//! Loading is one snapshot read through the [`LinkStore`]; view assembly is a
//! pure function of the loaded bundle. A successful resolution records a
//! view event on a detached task.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::SiteConfig;
use crate::models::profile::{ProfileBundle, present};
use crate::models::view::{
    ContactCard, ContactKind, CustomLinkView, FooterView, PublicProfileView, SocialIconView,
};
use crate::platform::{icon_for, label_for, social_grid_columns};
use crate::store::LinkStore;

pub const DISPLAY_NAME_PLACEHOLDER: &str = "Anonymous";
pub const AVATAR_PLACEHOLDER: &str = "/placeholder.svg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(Box<PublicProfileView>),
    NotFound,
}

pub async fn resolve_profile(
    store: Arc<dyn LinkStore>,
    site: &SiteConfig,
    username: &str,
) -> Resolution {
    let username = username.trim();
    if username.is_empty() {
        return Resolution::NotFound;
    }

    let bundle = match store.load_public_profile(username).await {
        Ok(Some(bundle)) => bundle,
        Ok(None) => {
            debug!("No profile for username {username}");
            return Resolution::NotFound;
        }
        Err(err) => {
            warn!("Profile load for {username} failed, rendering not found: {err}");
            return Resolution::NotFound;
        }
    };

    track_view(store, bundle.profile.id);
    Resolution::Found(Box::new(build_view(&bundle, site)))
}

/// Best-effort view event. Errors stay on this task.
fn track_view(store: Arc<dyn LinkStore>, profile_id: Uuid) {
    tokio::spawn(async move {
        if let Err(err) = store.record_view(profile_id, Utc::now()).await {
            warn!("Failed to record view for profile {profile_id}: {err}");
        }
    });
}

pub fn build_view(bundle: &ProfileBundle, site: &SiteConfig) -> PublicProfileView {
    let profile = &bundle.profile;
    let owned = |value: &Option<String>| present(value.as_deref()).map(str::to_string);

    let social_links: Vec<SocialIconView> = bundle
        .social_links
        .iter()
        .map(|link| SocialIconView {
            platform: link.platform.clone(),
            label: label_for(&link.platform, link.display_name.as_deref()),
            url: link.url.clone(),
            icon: icon_for(&link.platform),
        })
        .collect();

    let custom_links = bundle
        .custom_links
        .iter()
        .map(|link| CustomLinkView {
            title: link.title.clone(),
            url: link.url.clone(),
        })
        .collect();

    let mut contact_cards = Vec::with_capacity(2);
    if let Some(email) = owned(&profile.email) {
        contact_cards.push(ContactCard {
            kind: ContactKind::Email,
            href: format!("mailto:{email}"),
            value: email,
            action_label: "Contact",
        });
    }
    if let Some(phone) = owned(&profile.phone) {
        contact_cards.push(ContactCard {
            kind: ContactKind::Phone,
            href: format!("tel:{phone}"),
            value: phone,
            action_label: "Call",
        });
    }

    let avatar = owned(&profile.avatar_url);

    PublicProfileView {
        profile_id: profile.id,
        username: profile.username.clone().unwrap_or_default(),
        display_name: display_name(profile.first_name.as_deref(), profile.last_name.as_deref()),
        bio: owned(&profile.bio),
        location: owned(&profile.location),
        has_avatar: avatar.is_some(),
        avatar_url: avatar.unwrap_or_else(|| AVATAR_PLACEHOLDER.to_string()),
        social_grid_columns: social_grid_columns(social_links.len()),
        social_links,
        custom_links,
        contact_cards,
        footer: FooterView {
            powered_by: site.name.clone(),
            create_profile_href: "/",
        },
    }
}

pub fn display_name(first: Option<&str>, last: Option<&str>) -> String {
    let joined = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default());
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        DISPLAY_NAME_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::models::profile::Profile;
    use crate::platform::Icon;
    use crate::store::memory::MemoryStore;

    const SOCIALS: [&str; 8] = [
        "twitter",
        "instagram",
        "linkedin",
        "github",
        "youtube",
        "dribbble",
        "facebook",
        "tiktok",
    ];

    fn johndoe(store: &MemoryStore) -> Profile {
        let mut profile = store.add_profile(Some("johndoe"));
        profile.first_name = Some("John".into());
        profile.last_name = Some("Doe".into());
        profile.bio = Some("Digital Creator & Web Developer".into());
        profile.location = Some("San Francisco, CA".into());
        profile.email = Some(String::new());
        profile.phone = Some(String::new());
        store.put_profile(profile.clone());
        for platform in SOCIALS {
            store.seed_social_link(profile.id, platform, &format!("https://{platform}.com"));
        }
        store.seed_custom_link(profile.id, "My Portfolio", "https://example.com/portfolio");
        store.seed_custom_link(profile.id, "My Blog", "https://example.com/blog");
        profile
    }

    async fn wait_for_views(store: &MemoryStore, profile_id: Uuid, expected: usize) {
        for _ in 0..100 {
            if store.view_count(profile_id) >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("view was not recorded");
    }

    #[tokio::test]
    async fn unknown_username_is_not_found() {
        let store = MemoryStore::new();
        store.add_profile(Some("someone"));
        let resolution = resolve_profile(store.clone(), &SiteConfig::default(), "nobody").await;
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn blank_username_is_not_found() {
        let store = MemoryStore::new();
        let resolution = resolve_profile(store, &SiteConfig::default(), "   ").await;
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn store_failure_renders_not_found() {
        let store = MemoryStore::new();
        store.add_profile(Some("johndoe"));
        store.fail_reads.store(true, Ordering::SeqCst);
        let resolution = resolve_profile(store, &SiteConfig::default(), "johndoe").await;
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[tokio::test]
    async fn johndoe_scenario() {
        let store = MemoryStore::new();
        let profile = johndoe(&store);

        let Resolution::Found(view) =
            resolve_profile(store.clone(), &SiteConfig::default(), "johndoe").await
        else {
            panic!("johndoe should resolve");
        };

        assert_eq!(view.display_name, "John Doe");
        assert_eq!(view.social_grid_columns, 4);
        assert_eq!(view.social_links.len(), 8);
        assert_eq!(view.social_links[0].icon, Icon::Twitter);
        assert_eq!(view.social_links[7].icon, Icon::Music);
        assert_eq!(view.custom_links.len(), 2);
        assert_eq!(view.custom_links[0].title, "My Portfolio");
        assert!(view.contact_cards.is_empty());
        assert_eq!(view.avatar_url, AVATAR_PLACEHOLDER);
        assert!(!view.has_avatar);

        wait_for_views(&store, profile.id, 1).await;
    }

    #[tokio::test]
    async fn view_tracking_failure_does_not_affect_render() {
        let store = MemoryStore::new();
        johndoe(&store);
        store.fail_views.store(true, Ordering::SeqCst);

        let resolution = resolve_profile(store.clone(), &SiteConfig::default(), "johndoe").await;
        assert!(matches!(resolution, Resolution::Found(_)));
    }

    #[test]
    fn display_name_collapses_to_placeholder() {
        assert_eq!(display_name(Some("Ada"), Some("Lovelace")), "Ada Lovelace");
        assert_eq!(display_name(Some("Ada"), Some("")), "Ada");
        assert_eq!(display_name(None, Some("Lovelace")), "Lovelace");
        assert_eq!(display_name(Some(" "), None), DISPLAY_NAME_PLACEHOLDER);
    }

    #[test]
    fn optional_fields_are_suppressed() {
        let store = MemoryStore::new();
        let mut profile = store.add_profile(Some("ada"));
        profile.email = Some("ada@example.com".into());
        profile.phone = None;
        profile.location = Some("".into());
        profile.avatar_url = Some("https://blobs.test/ada.png".into());
        let bundle = ProfileBundle {
            profile,
            social_links: Vec::new(),
            custom_links: Vec::new(),
        };

        let view = build_view(&bundle, &SiteConfig::default());
        assert_eq!(view.location, None);
        assert_eq!(view.bio, None);
        assert_eq!(view.contact_cards.len(), 1);
        assert_eq!(view.contact_cards[0].href, "mailto:ada@example.com");
        assert_eq!(view.avatar_url, "https://blobs.test/ada.png");
        assert!(view.has_avatar);
        assert_eq!(view.social_grid_columns, 3);

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("location").is_none());
        assert!(json.get("bio").is_none());
    }

    #[test]
    fn unknown_platform_renders_globe() {
        let store = MemoryStore::new();
        let profile = store.add_profile(Some("ada"));
        let link = store.seed_social_link(profile.id, "myspace", "https://myspace.com/ada");
        let bundle = ProfileBundle {
            profile,
            social_links: vec![link],
            custom_links: Vec::new(),
        };

        let view = build_view(&bundle, &SiteConfig::default());
        assert_eq!(view.social_links[0].icon, Icon::Globe);
        assert_eq!(view.social_links[0].label, "myspace");
    }
}
