//! Owner dashboard state and its reconciliation with the link store.
//!
//! A [`Dashboard`] is the owner's editable copy of their profile fields and
//! both link lists. It is loaded once, then every operation writes through
//! the store and only touches the local lists after the store confirms.
//! Each operation keeps its own loading flag so a duplicate submission is
//! refused while unrelated operations proceed.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use axum::body::Bytes;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::Identity;
use crate::blob::{BlobStore, avatar_key};
use crate::config::SiteConfig;
use crate::models::dashboard::{
    DashboardSnapshot, NoticeLevel, NoticeView, Operation, PlatformOption, SocialLinkEntry,
};
use crate::models::profile::{CustomLink, NewCustomLink, NewSocialLink, ProfileFields, SocialLink};
use crate::platform::{Platform, icon_for, label_for};
use crate::store::{LinkStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    #[error("You must be signed in to edit this profile")]
    Unauthenticated,
    #[error("{0}")]
    Validation(&'static str),
    #[error("{0}")]
    Store(String),
    #[error("This request is already in progress")]
    Busy,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    raised_at: Instant,
}

pub struct Dashboard {
    owner_id: Uuid,
    notice_ttl: Duration,
    fields: Mutex<ProfileFields>,
    social_links: Mutex<Vec<SocialLink>>,
    custom_links: Mutex<Vec<CustomLink>>,
    notice: Mutex<Option<Notice>>,
    in_flight: Mutex<HashSet<Operation>>,
}

/// Clears the operation's loading flag when dropped.
struct InFlight<'a> {
    dashboard: &'a Dashboard,
    operation: Operation,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(&self.dashboard.in_flight).remove(&self.operation);
    }
}

impl Dashboard {
    pub async fn load(
        store: &dyn LinkStore,
        identity: &Identity,
        notice_ttl: Duration,
    ) -> Result<Self, StoreError> {
        let state = store.load_owner_state(identity.user_id).await?;
        let fields = state
            .profile
            .as_ref()
            .map(ProfileFields::from_profile)
            .unwrap_or_default();

        Ok(Self {
            owner_id: identity.user_id,
            notice_ttl,
            fields: Mutex::new(fields),
            social_links: Mutex::new(state.social_links),
            custom_links: Mutex::new(state.custom_links),
            notice: Mutex::new(None),
            in_flight: Mutex::new(HashSet::new()),
        })
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn fields(&self) -> ProfileFields {
        lock(&self.fields).clone()
    }

    pub fn social_links(&self) -> Vec<SocialLink> {
        lock(&self.social_links).clone()
    }

    pub fn custom_links(&self) -> Vec<CustomLink> {
        lock(&self.custom_links).clone()
    }

    /// The current notice, unless it has outlived the notice interval.
    pub fn notice(&self) -> Option<Notice> {
        let mut slot = lock(&self.notice);
        if slot
            .as_ref()
            .is_some_and(|notice| notice.raised_at.elapsed() >= self.notice_ttl)
        {
            *slot = None;
        }
        slot.clone()
    }

    pub fn loading(&self) -> Vec<Operation> {
        let mut operations: Vec<Operation> = lock(&self.in_flight).iter().copied().collect();
        operations.sort();
        operations
    }

    pub fn profile_url(&self, site: &SiteConfig) -> String {
        match lock(&self.fields).stored_username() {
            Some(username) => format!("{}/{username}", site.base_url()),
            None => format!("{}/user/{}", site.base_url(), self.owner_id),
        }
    }

    pub fn snapshot(&self, site: &SiteConfig) -> DashboardSnapshot {
        let social_links = self
            .social_links()
            .into_iter()
            .map(|link| SocialLinkEntry {
                platform_name: label_for(&link.platform, None),
                icon: icon_for(&link.platform),
                link,
            })
            .collect();

        DashboardSnapshot {
            profile: self.fields(),
            profile_url: self.profile_url(site),
            social_links,
            custom_links: self.custom_links(),
            notice: self.notice().map(|notice| NoticeView {
                level: notice.level,
                message: notice.message,
            }),
            loading: self.loading(),
            platforms: PlatformOption::all(),
        }
    }

    /// Applies `fields` locally as typed, then persists them.
    ///
    /// A failed write leaves the typed values in place. Usernames that collide
    /// with fixed routes are refused before anything changes.
    pub async fn update_profile(
        &self,
        store: &dyn LinkStore,
        identity: Option<&Identity>,
        fields: ProfileFields,
    ) -> Result<(), DashboardError> {
        let _guard = self.begin(Operation::UpdateProfile, identity)?;

        let result = if fields.has_reserved_username() {
            Err(DashboardError::Validation("This username is not available"))
        } else {
            *lock(&self.fields) = fields.clone();
            store
                .update_profile(self.owner_id, &fields)
                .await
                .map_err(|err| DashboardError::Store(err.user_message("Error updating profile")))
        };
        self.finish(result, "Profile updated successfully!")
    }

    /// Uploads the avatar blob, then points the profile at its public URL.
    ///
    /// The two writes are independent: if the profile update fails the blob
    /// stays where it is and the local field already holds the new URL, so
    /// a later profile save persists it.
    pub async fn upload_avatar(
        &self,
        store: &dyn LinkStore,
        blobs: &dyn BlobStore,
        identity: Option<&Identity>,
        content: Bytes,
        content_type: &str,
    ) -> Result<String, DashboardError> {
        const FALLBACK: &str = "Error uploading profile picture";
        let _guard = self.begin(Operation::UploadAvatar, identity)?;

        let result: Result<String, DashboardError> = async {
            if content.is_empty() {
                return Err(DashboardError::Validation("Please choose an image to upload"));
            }

            let key = avatar_key(self.owner_id, content_type, Utc::now());
            blobs
                .upload(&key, content, content_type, true)
                .await
                .map_err(|err| DashboardError::Store(err.user_message(FALLBACK)))?;

            let url = blobs.public_url(&key);
            lock(&self.fields).avatar_url = url.clone();

            if let Err(err) = store.set_avatar_url(self.owner_id, &url).await {
                warn!("Avatar stored at {key} but profile update failed: {err}");
                return Err(DashboardError::Store(err.user_message(FALLBACK)));
            }
            info!("Avatar for {} stored at {key}", self.owner_id);
            Ok(url)
        }
        .await;

        self.finish(result, "Profile picture updated successfully!")
    }

    pub async fn add_social_link(
        &self,
        store: &dyn LinkStore,
        identity: Option<&Identity>,
        platform: &str,
        url: &str,
        display_name: Option<&str>,
    ) -> Result<SocialLink, DashboardError> {
        let _guard = self.begin(Operation::AddSocialLink, identity)?;

        let result: Result<SocialLink, DashboardError> = async {
            let url = url.trim();
            if platform.trim().is_empty() || url.is_empty() {
                return Err(DashboardError::Validation(
                    "Please select a platform and enter a URL",
                ));
            }
            let platform = Platform::normalize(platform)
                .ok_or(DashboardError::Validation("Please select a supported platform"))?;

            let display_name = display_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string);
            let link = NewSocialLink {
                platform: platform.id().to_string(),
                url: url.to_string(),
                display_name,
            };

            let row = store
                .insert_social_link(self.owner_id, link)
                .await
                .map_err(|err| DashboardError::Store(err.user_message("Error adding social link")))?;
            lock(&self.social_links).push(row.clone());
            Ok(row)
        }
        .await;

        self.finish(result, "Social link added successfully!")
    }

    pub async fn add_custom_link(
        &self,
        store: &dyn LinkStore,
        identity: Option<&Identity>,
        title: &str,
        url: &str,
    ) -> Result<CustomLink, DashboardError> {
        let _guard = self.begin(Operation::AddCustomLink, identity)?;

        let result: Result<CustomLink, DashboardError> = async {
            if title.trim().is_empty() || url.trim().is_empty() {
                return Err(DashboardError::Validation("Please enter a title and URL"));
            }
            let link = NewCustomLink {
                title: title.to_string(),
                url: url.to_string(),
            };

            let row = store
                .insert_custom_link(self.owner_id, link)
                .await
                .map_err(|err| DashboardError::Store(err.user_message("Error adding custom link")))?;
            lock(&self.custom_links).push(row.clone());
            Ok(row)
        }
        .await;

        self.finish(result, "Custom link added successfully!")
    }

    pub async fn delete_social_link(
        &self,
        store: &dyn LinkStore,
        identity: Option<&Identity>,
        link_id: Uuid,
    ) -> Result<(), DashboardError> {
        let _guard = self.begin(Operation::DeleteSocialLink, identity)?;

        let result = store
            .delete_social_link(self.owner_id, link_id)
            .await
            .map_err(|err| DashboardError::Store(err.user_message("Error deleting social link")));
        if result.is_ok() {
            lock(&self.social_links).retain(|link| link.id != link_id);
        }
        self.finish(result, "Social link deleted successfully!")
    }

    pub async fn delete_custom_link(
        &self,
        store: &dyn LinkStore,
        identity: Option<&Identity>,
        link_id: Uuid,
    ) -> Result<(), DashboardError> {
        let _guard = self.begin(Operation::DeleteCustomLink, identity)?;

        let result = store
            .delete_custom_link(self.owner_id, link_id)
            .await
            .map_err(|err| DashboardError::Store(err.user_message("Error deleting custom link")));
        if result.is_ok() {
            lock(&self.custom_links).retain(|link| link.id != link_id);
        }
        self.finish(result, "Custom link deleted successfully!")
    }

    fn begin(
        &self,
        operation: Operation,
        identity: Option<&Identity>,
    ) -> Result<InFlight<'_>, DashboardError> {
        let is_owner = identity.is_some_and(|identity| identity.user_id == self.owner_id);
        if !is_owner {
            let err = DashboardError::Unauthenticated;
            self.raise(NoticeLevel::Error, err.to_string());
            return Err(err);
        }

        if !lock(&self.in_flight).insert(operation) {
            return Err(DashboardError::Busy);
        }
        Ok(InFlight {
            dashboard: self,
            operation,
        })
    }

    fn finish<T>(
        &self,
        result: Result<T, DashboardError>,
        success: &str,
    ) -> Result<T, DashboardError> {
        match &result {
            Ok(_) => self.raise(NoticeLevel::Success, success.to_string()),
            Err(err) => self.raise(NoticeLevel::Error, err.to_string()),
        }
        result
    }

    fn raise(&self, level: NoticeLevel, message: String) {
        *lock(&self.notice) = Some(Notice {
            level,
            message,
            raised_at: Instant::now(),
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
