//! In-memory store, blob store and auth gate for tests.
//!
//! Counts every write and can be told to fail reads, writes or uploads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::auth::{AuthGate, Identity};
use crate::blob::BlobStore;
use crate::models::profile::{
    CustomLink, NewCustomLink, NewSocialLink, OwnerState, Profile, ProfileBundle, ProfileFields,
    SocialLink,
};

use super::{LinkStore, StoreError};

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, Profile>,
    social_links: Vec<SocialLink>,
    custom_links: Vec<CustomLink>,
    views: Vec<(Uuid, DateTime<Utc>)>,
    sessions: HashMap<String, Identity>,
    blobs: HashMap<String, (Bytes, String)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    clock: AtomicUsize,
    pub writes: AtomicUsize,
    pub uploads: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_avatar_url: AtomicBool,
    pub fail_views: AtomicBool,
    pub fail_uploads: AtomicBool,
    pub fail_sessions: AtomicBool,
    failure_message: Mutex<String>,
    insert_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_profile(&self, username: Option<&str>) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4(),
            username: username.map(str::to_string),
            first_name: None,
            last_name: None,
            bio: None,
            location: None,
            phone: None,
            email: None,
            avatar_url: None,
        };
        self.put_profile(profile.clone());
        profile
    }

    pub fn put_profile(&self, profile: Profile) {
        self.tables().profiles.insert(profile.id, profile);
    }

    pub fn profile(&self, id: Uuid) -> Option<Profile> {
        self.tables().profiles.get(&id).cloned()
    }

    pub fn add_session(&self, token: &str, identity: Identity) {
        self.tables().sessions.insert(token.to_string(), identity);
    }

    pub fn seed_social_link(&self, owner_id: Uuid, platform: &str, url: &str) -> SocialLink {
        let link = SocialLink {
            id: Uuid::new_v4(),
            user_id: owner_id,
            platform: platform.to_string(),
            url: url.to_string(),
            display_name: None,
            created_at: self.tick(),
        };
        self.tables().social_links.push(link.clone());
        link
    }

    pub fn seed_custom_link(&self, owner_id: Uuid, title: &str, url: &str) -> CustomLink {
        let link = CustomLink {
            id: Uuid::new_v4(),
            user_id: owner_id,
            title: title.to_string(),
            url: url.to_string(),
            created_at: self.tick(),
        };
        self.tables().custom_links.push(link.clone());
        link
    }

    pub fn view_count(&self, profile_id: Uuid) -> usize {
        self.tables()
            .views
            .iter()
            .filter(|(id, _)| *id == profile_id)
            .count()
    }

    pub fn blob(&self, key: &str) -> Option<Bytes> {
        self.tables().blobs.get(key).map(|(bytes, _)| bytes.clone())
    }

    pub fn blob_keys(&self) -> Vec<String> {
        self.tables().blobs.keys().cloned().collect()
    }

    pub fn set_failure_message(&self, message: &str) {
        *self.failure_message.lock().unwrap() = message.to_string();
    }

    /// Make link inserts wait until the returned semaphore gets a permit.
    pub fn hold_inserts(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.insert_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    fn tick(&self) -> DateTime<Utc> {
        let step = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(step as i64)
    }

    fn failure(&self) -> StoreError {
        StoreError::Rejected(self.failure_message.lock().unwrap().clone())
    }

    fn begin_write(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        Ok(())
    }

    async fn wait_for_gate(&self) {
        let gate = self.insert_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate open").forget();
        }
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn load_public_profile(
        &self,
        username: &str,
    ) -> Result<Option<ProfileBundle>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        let tables = self.tables();
        let Some(profile) = tables
            .profiles
            .values()
            .find(|profile| profile.username.as_deref() == Some(username))
            .cloned()
        else {
            return Ok(None);
        };
        let owned = |owner: Uuid| owner == profile.id;
        Ok(Some(ProfileBundle {
            social_links: sorted(
                tables.social_links.iter().filter(|l| owned(l.user_id)).cloned(),
                |l| l.created_at,
            ),
            custom_links: sorted(
                tables.custom_links.iter().filter(|l| owned(l.user_id)).cloned(),
                |l| l.created_at,
            ),
            profile,
        }))
    }

    async fn load_owner_state(&self, owner_id: Uuid) -> Result<OwnerState, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        let tables = self.tables();
        Ok(OwnerState {
            profile: tables.profiles.get(&owner_id).cloned(),
            social_links: sorted(
                tables
                    .social_links
                    .iter()
                    .filter(|l| l.user_id == owner_id)
                    .cloned(),
                |l| l.created_at,
            ),
            custom_links: sorted(
                tables
                    .custom_links
                    .iter()
                    .filter(|l| l.user_id == owner_id)
                    .cloned(),
                |l| l.created_at,
            ),
        })
    }

    async fn update_profile(
        &self,
        owner_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut tables = self.tables();
        let profile = tables
            .profiles
            .get_mut(&owner_id)
            .ok_or(StoreError::NotFound("Profile"))?;
        profile.username = fields.stored_username();
        profile.first_name = Some(fields.first_name.clone());
        profile.last_name = Some(fields.last_name.clone());
        profile.bio = Some(fields.bio.clone());
        profile.location = Some(fields.location.clone());
        profile.phone = Some(fields.phone.clone());
        profile.email = Some(fields.email.clone());
        profile.avatar_url = Some(fields.avatar_url.clone());
        Ok(())
    }

    async fn set_avatar_url(&self, owner_id: Uuid, avatar_url: &str) -> Result<(), StoreError> {
        self.begin_write()?;
        if self.fail_avatar_url.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        let mut tables = self.tables();
        let profile = tables
            .profiles
            .get_mut(&owner_id)
            .ok_or(StoreError::NotFound("Profile"))?;
        profile.avatar_url = Some(avatar_url.to_string());
        Ok(())
    }

    async fn insert_social_link(
        &self,
        owner_id: Uuid,
        link: NewSocialLink,
    ) -> Result<SocialLink, StoreError> {
        self.wait_for_gate().await;
        self.begin_write()?;
        let row = SocialLink {
            id: Uuid::new_v4(),
            user_id: owner_id,
            platform: link.platform,
            url: link.url,
            display_name: link.display_name,
            created_at: self.tick(),
        };
        self.tables().social_links.push(row.clone());
        Ok(row)
    }

    async fn insert_custom_link(
        &self,
        owner_id: Uuid,
        link: NewCustomLink,
    ) -> Result<CustomLink, StoreError> {
        self.wait_for_gate().await;
        self.begin_write()?;
        let row = CustomLink {
            id: Uuid::new_v4(),
            user_id: owner_id,
            title: link.title,
            url: link.url,
            created_at: self.tick(),
        };
        self.tables().custom_links.push(row.clone());
        Ok(row)
    }

    async fn delete_social_link(&self, owner_id: Uuid, link_id: Uuid) -> Result<(), StoreError> {
        self.begin_write()?;
        self.tables()
            .social_links
            .retain(|l| !(l.id == link_id && l.user_id == owner_id));
        Ok(())
    }

    async fn delete_custom_link(&self, owner_id: Uuid, link_id: Uuid) -> Result<(), StoreError> {
        self.begin_write()?;
        self.tables()
            .custom_links
            .retain(|l| !(l.id == link_id && l.user_id == owner_id));
        Ok(())
    }

    async fn record_view(
        &self,
        profile_id: Uuid,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        if self.fail_views.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        self.tables().views.push((profile_id, viewed_at));
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
        _upsert: bool,
    ) -> Result<(), StoreError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        self.tables()
            .blobs
            .insert(key.to_string(), (content, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://blobs.test/{key}")
    }
}

#[async_trait]
impl AuthGate for MemoryStore {
    async fn identify(&self, token: &str) -> Result<Option<Identity>, StoreError> {
        if self.fail_sessions.load(Ordering::SeqCst) {
            return Err(self.failure());
        }
        Ok(self.tables().sessions.get(token).cloned())
    }
}

fn sorted<T, K: Ord>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| key(item));
    items
}
