use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self> {
        let configured_path =
            std::env::var("TAPLINK_API_CONFIG").unwrap_or_else(|_| "config/api.toml".to_string());
        assert!(
            !configured_path.is_empty(),
            "Configuration path must be non-empty"
        );
        assert!(
            configured_path.len() < 4096,
            "Configuration path length exceeds hard limit"
        );

        let mut builder = Config::builder()
            .add_source(File::new(&configured_path, FileFormat::Toml).required(true));

        if let Ok(env_override) = std::env::var("TAPLINK_API_ENV") {
            if !env_override.is_empty() {
                let env_file = format!("config/api.{}.toml", env_override);
                if Path::new(&env_file).exists() {
                    builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
                }
            }
        }

        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, &configured_path))?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: Config) -> Result<Self> {
        let mut config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize API configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> Result<()> {
        if self.database.url.is_empty() {
            bail!("Database URL must be specified");
        }
        if self.server.port == 0 {
            bail!("Server port must be greater than zero");
        }
        if self.database.max_connections < self.database.min_connections.unwrap_or(1) {
            bail!("Max connections must be >= min connections");
        }
        if self.database.max_connections > 128 {
            bail!("Connection pool oversized");
        }
        self.storage.ensure_bounds()?;
        self.site.ensure_bounds()?;
        self.dashboard.ensure_bounds()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<IpAddr>,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(self.port != 0, "HTTP port cannot be zero");
        SocketAddr::new(host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: Option<u32>,
}

/// Where avatar blobs land on disk and how they are addressed publicly.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub root: PathBuf,
    #[serde(default = "StorageConfig::default_bucket")]
    pub bucket: String,
    /// Prefix for public URLs, e.g. `https://taplink.example`. Empty keeps URLs host-relative.
    #[serde(default)]
    pub public_base_url: String,
    #[serde(default = "StorageConfig::default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl StorageConfig {
    fn ensure_bounds(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            bail!("Storage root must be specified");
        }
        if self.bucket.is_empty() || self.bucket.contains(['/', '\\', '.']) {
            bail!("Storage bucket must be a single path segment");
        }
        if self.max_upload_bytes == 0 || self.max_upload_bytes > 50 * 1024 * 1024 {
            bail!("Upload limit must be between 1 byte and 50 MiB");
        }
        Ok(())
    }

    fn default_bucket() -> String {
        "user-profile-pictures".to_string()
    }

    const fn default_max_upload_bytes() -> usize {
        5 * 1024 * 1024
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub domain: String,
    pub protocol: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "TapLink".to_string(),
            domain: "localhost:3000".to_string(),
            protocol: "http".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }

    fn ensure_bounds(&self) -> Result<()> {
        if self.protocol != "http" && self.protocol != "https" {
            bail!("Site protocol must be http or https, got {}", self.protocol);
        }
        if self.domain.is_empty() {
            bail!("Site domain must be specified");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    pub notice_ttl_ms: u64,
    pub sessions_max_capacity: u64,
    pub sessions_idle_seconds: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            notice_ttl_ms: 3_000,
            sessions_max_capacity: 10_000,
            sessions_idle_seconds: 1_800,
        }
    }
}

impl DashboardConfig {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn sessions_idle(&self) -> Duration {
        Duration::from_secs(self.sessions_idle_seconds)
    }

    fn ensure_bounds(&self) -> Result<()> {
        if self.notice_ttl_ms > 60_000 {
            bail!("Notice TTL cannot exceed 60 seconds");
        }
        if self.sessions_max_capacity == 0 {
            bail!("Dashboard session capacity must be positive");
        }
        if self.sessions_idle_seconds == 0 || self.sessions_idle_seconds > 86_400 {
            bail!("Dashboard session idle timeout must be within one day");
        }
        Ok(())
    }
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}
