use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache;

use crate::auth::{AuthGate, Identity};
use crate::blob::BlobStore;
use crate::config::{DashboardConfig, SiteConfig};
use crate::dashboard::Dashboard;
use crate::store::{LinkStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LinkStore>,
    pub auth: Arc<dyn AuthGate>,
    pub blobs: Arc<dyn BlobStore>,
    pub dashboards: Arc<DashboardSessions>,
    pub site: SiteConfig,
    pub max_upload_bytes: usize,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn LinkStore>,
        auth: Arc<dyn AuthGate>,
        blobs: Arc<dyn BlobStore>,
        dashboards: Arc<DashboardSessions>,
        site: SiteConfig,
        max_upload_bytes: usize,
    ) -> Self {
        assert!(max_upload_bytes > 0, "Upload limit must be configured");
        assert!(!site.domain.is_empty(), "Site domain must be configured");
        Self {
            store,
            auth,
            blobs,
            dashboards,
            site,
            max_upload_bytes,
            start_time: Instant::now(),
        }
    }
}

/// Live dashboards keyed by session token.
///
/// A dashboard is loaded from the store on first use and reused until the
/// session goes idle or is evicted for capacity.
pub struct DashboardSessions {
    sessions: Cache<String, Arc<Dashboard>>,
    notice_ttl: Duration,
}

impl DashboardSessions {
    pub fn new(config: &DashboardConfig) -> Self {
        assert!(
            config.sessions_max_capacity >= 1,
            "Dashboard session capacity must be positive"
        );
        let sessions = Cache::builder()
            .max_capacity(config.sessions_max_capacity)
            .time_to_idle(config.sessions_idle())
            .build();
        Self {
            sessions,
            notice_ttl: config.notice_ttl(),
        }
    }

    pub async fn get_or_load(
        &self,
        token: &str,
        identity: &Identity,
        store: &dyn LinkStore,
    ) -> Result<Arc<Dashboard>, Arc<StoreError>> {
        if let Some(existing) = self.sessions.get(token).await {
            if existing.owner_id() == identity.user_id {
                return Ok(existing);
            }
            self.sessions.invalidate(token).await;
        }

        self.sessions
            .try_get_with(token.to_string(), async {
                Dashboard::load(store, identity, self.notice_ttl)
                    .await
                    .map(Arc::new)
            })
            .await
    }

    /// The dashboard already open for `token`, without touching the store.
    pub async fn cached(&self, token: &str) -> Option<Arc<Dashboard>> {
        self.sessions.get(token).await
    }

    pub fn entry_count(&self) -> u64 {
        self.sessions.entry_count()
    }
}
