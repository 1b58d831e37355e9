//! Avatar blob storage.
//!
//! Blobs are opaque: stored under a caller-chosen key and exposed through a
//! public URL. The filesystem backend writes below `<root>/<bucket>/` and the
//! HTTP layer serves that tree under `/storage`.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::config::StorageConfig;
use crate::store::StoreError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StoreError>;

    fn public_url(&self, key: &str) -> String;
}

pub struct FsBlobStore {
    bucket_dir: PathBuf,
    url_prefix: String,
}

impl FsBlobStore {
    pub fn new(config: &StorageConfig) -> Self {
        let base = config.public_base_url.trim_end_matches('/');
        Self {
            bucket_dir: config.root.join(&config.bucket),
            url_prefix: format!("{base}/storage/{}", config.bucket),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let clean = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !clean {
            return Err(StoreError::Rejected(format!("Invalid storage key: {key}")));
        }
        Ok(self.bucket_dir.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        if !upsert && tokio::fs::try_exists(&path).await? {
            return Err(StoreError::Blob(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "The resource already exists",
            )));
        }
        tokio::fs::write(&path, &content).await?;
        debug!(
            "Stored blob {key} ({} bytes, {content_type})",
            content.len()
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.url_prefix)
    }
}

/// Storage key for a new avatar, scoped under the owner's id.
///
/// Millisecond timestamp plus a random suffix, so repeated or concurrent
/// uploads never share a key.
pub fn avatar_key(owner_id: Uuid, content_type: &str, now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{owner_id}/avatar-{}-{}.{}",
        now.timestamp_millis(),
        &suffix[..8],
        extension_for(content_type)
    )
}

fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/avif" => "avif",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> StorageConfig {
        StorageConfig {
            root: std::env::temp_dir().join(format!("taplink-blob-{}", Uuid::new_v4())),
            bucket: "avatars".to_string(),
            public_base_url: "https://cdn.example/".to_string(),
            max_upload_bytes: 1024,
        }
    }

    #[test]
    fn avatar_keys_are_owner_scoped_and_unique() {
        let owner = Uuid::new_v4();
        let now = Utc::now();
        let first = avatar_key(owner, "image/png", now);
        let second = avatar_key(owner, "image/png", now);
        assert!(first.starts_with(&format!("{owner}/avatar-{}-", now.timestamp_millis())));
        assert!(first.ends_with(".png"));
        assert_ne!(first, second);
    }

    #[test]
    fn extensions_follow_content_type() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("IMAGE/WEBP; charset=binary"), "webp");
        assert_eq!(extension_for("application/octet-stream"), "bin");
        assert_eq!(extension_for(""), "bin");
        assert_eq!(extension_for("image/svg+xml"), "bin");
    }

    #[test]
    fn public_url_includes_bucket() {
        let store = FsBlobStore::new(&temp_config());
        assert_eq!(
            store.public_url("u/avatar.png"),
            "https://cdn.example/storage/avatars/u/avatar.png"
        );
    }

    #[tokio::test]
    async fn upload_writes_and_overwrites() {
        let config = temp_config();
        let store = FsBlobStore::new(&config);
        store
            .upload("owner/a.png", Bytes::from_static(b"one"), "image/png", true)
            .await
            .expect("first upload");
        store
            .upload("owner/a.png", Bytes::from_static(b"two"), "image/png", true)
            .await
            .expect("upsert upload");

        let written = tokio::fs::read(config.root.join("avatars/owner/a.png"))
            .await
            .expect("blob on disk");
        assert_eq!(written, b"two");

        let refused = store
            .upload("owner/a.png", Bytes::from_static(b"three"), "image/png", false)
            .await;
        assert!(refused.is_err());

        let _ = tokio::fs::remove_dir_all(&config.root).await;
    }

    #[tokio::test]
    async fn rejects_escaping_keys() {
        let store = FsBlobStore::new(&temp_config());
        for key in ["../etc/passwd", "/abs/path", "", "a/../../b"] {
            let result = store
                .upload(key, Bytes::from_static(b"x"), "image/png", true)
                .await;
            assert!(result.is_err(), "key {key:?} accepted");
        }
    }
}
