//! Persistence boundary for profiles, link collections and view events.
//!
//! Handlers and the dashboard only see [`LinkStore`]; the PostgreSQL
//! implementation lives in [`postgres`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use uuid::Uuid;

use crate::models::profile::{
    CustomLink, NewCustomLink, NewSocialLink, OwnerState, ProfileBundle, ProfileFields,
    SocialLink,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgLinkStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] DbErr),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Blob(#[from] std::io::Error),
    #[error("{0}")]
    Rejected(String),
}

impl StoreError {
    /// Message for the owner: the store's own text, or `fallback` when it has none.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Profile plus both link collections for `username`, read as one snapshot.
    async fn load_public_profile(&self, username: &str)
    -> Result<Option<ProfileBundle>, StoreError>;

    async fn load_owner_state(&self, owner_id: Uuid) -> Result<OwnerState, StoreError>;

    async fn update_profile(&self, owner_id: Uuid, fields: &ProfileFields)
    -> Result<(), StoreError>;

    async fn set_avatar_url(&self, owner_id: Uuid, avatar_url: &str) -> Result<(), StoreError>;

    async fn insert_social_link(
        &self,
        owner_id: Uuid,
        link: NewSocialLink,
    ) -> Result<SocialLink, StoreError>;

    async fn insert_custom_link(
        &self,
        owner_id: Uuid,
        link: NewCustomLink,
    ) -> Result<CustomLink, StoreError>;

    async fn delete_social_link(&self, owner_id: Uuid, link_id: Uuid) -> Result<(), StoreError>;

    async fn delete_custom_link(&self, owner_id: Uuid, link_id: Uuid) -> Result<(), StoreError>;

    async fn record_view(&self, profile_id: Uuid, viewed_at: DateTime<Utc>)
    -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_store_text() {
        let err = StoreError::Rejected("duplicate key value violates unique constraint".into());
        assert_eq!(
            err.user_message("Error updating profile"),
            "duplicate key value violates unique constraint"
        );
    }

    #[test]
    fn user_message_falls_back_when_blank() {
        let err = StoreError::Rejected(String::new());
        assert_eq!(err.user_message("Error adding social link"), "Error adding social link");
    }

    #[test]
    fn not_found_names_the_record() {
        assert_eq!(StoreError::NotFound("Profile").to_string(), "Profile not found");
    }
}
