//! Configuration module for Marquee.
//!
//! Loads configuration from `config.toml` with environment variable overrides.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::error::AppError;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub collections: CollectionsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub embed: EmbedConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// TMDB API configuration
#[derive(Clone, Deserialize)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_tmdb_image_base")]
    pub image_base: String,
    #[serde(default = "default_tmdb_timeout")]
    pub timeout_secs: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_tmdb_base_url(),
            image_base: default_tmdb_image_base(),
            timeout_secs: default_tmdb_timeout(),
        }
    }
}

// Custom Debug implementation to avoid exposing api_key
impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("image_base", &self.image_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_tmdb_timeout() -> u64 {
    30
}

/// Featured-hero carousel timing
#[derive(Debug, Clone, Deserialize)]
pub struct CarouselConfig {
    #[serde(default = "default_auto_advance")]
    pub auto_advance_secs: u64,
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
    #[serde(default = "default_featured_count")]
    pub featured_count: usize,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            auto_advance_secs: default_auto_advance(),
            transition_ms: default_transition_ms(),
            grace_ms: default_grace_ms(),
            featured_count: default_featured_count(),
        }
    }
}

impl CarouselConfig {
    pub fn auto_advance(&self) -> Duration {
        Duration::from_secs(self.auto_advance_secs)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

fn default_auto_advance() -> u64 {
    10
}

fn default_transition_ms() -> u64 {
    1000
}

fn default_grace_ms() -> u64 {
    800
}

fn default_featured_count() -> usize {
    6
}

/// Catalog grid configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Ceiling the metadata service imposes on reachable pages.
    #[serde(default = "default_max_total_pages")]
    pub max_total_pages: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_total_pages: default_max_total_pages(),
        }
    }
}

fn default_max_total_pages() -> u32 {
    500
}

/// Collection scanner bounds
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionsConfig {
    #[serde(default = "default_collection_cap")]
    pub cap: usize,
    #[serde(default = "default_collection_pages")]
    pub max_pages: u32,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            cap: default_collection_cap(),
            max_pages: default_collection_pages(),
        }
    }
}

fn default_collection_cap() -> usize {
    20
}

fn default_collection_pages() -> u32 {
    5
}

/// In-memory browsing session lifetime
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_idle_timeout() -> u64 {
    1800
}

fn default_sweep_interval() -> u64 {
    60
}

/// Playback embed providers
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedConfig {
    #[serde(default = "default_providers")]
    pub providers: Vec<EmbedProviderConfig>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
        }
    }
}

/// A single embed provider.
///
/// Templates substitute `{id}`, `{season}` and `{episode}`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedProviderConfig {
    pub id: String,
    pub label: String,
    #[serde(default = "default_quality")]
    pub quality: String,
    pub movie_template: String,
    pub episode_template: String,
}

fn default_quality() -> String {
    "Auto".to_string()
}

fn default_providers() -> Vec<EmbedProviderConfig> {
    let provider = |id: &str, label: &str, quality: &str, movie: &str, episode: &str| {
        EmbedProviderConfig {
            id: id.to_string(),
            label: label.to_string(),
            quality: quality.to_string(),
            movie_template: movie.to_string(),
            episode_template: episode.to_string(),
        }
    };

    vec![
        provider(
            "v1",
            "Source V1",
            "Auto",
            "https://vidsrc.icu/embed/movie/{id}",
            "https://vidsrc.cc/v2/embed/tv/{id}/{season}/{episode}",
        ),
        provider(
            "v2",
            "Source V2",
            "Auto",
            "https://vidsrc.xyz/embed/movie/{id}",
            "https://vidsrc.pro/embed/tv/{id}/{season}/{episode}",
        ),
        provider(
            "v3",
            "Source V3",
            "Auto",
            "https://vidsrc.to/embed/movie/{id}",
            "https://vidsrc.icu/embed/tv/{id}/{season}/{episode}",
        ),
        provider(
            "4k",
            "Source 4K",
            "4K",
            "https://vidsrc.pro/embed/movie/{id}",
            "https://autoembed.cc/tv/tmdb/{id}-{season}-{episode}",
        ),
    ]
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. `config.toml` in current directory (optional)
    /// 3. Environment variables with `MARQUEE_` prefix
    ///
    /// Environment variables use double underscore for nesting:
    /// - `MARQUEE_SERVER__PORT=9000` sets `server.port`
    /// - `MARQUEE_TMDB__API_KEY=...` sets `tmdb.api_key`
    pub fn load() -> Result<Self, AppError> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from(config_path: &str) -> Result<Self, AppError> {
        let config = ConfigLoader::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("carousel.auto_advance_secs", 10)?
            .set_default("carousel.transition_ms", 1000)?
            .set_default("carousel.grace_ms", 800)?
            .set_default("collections.cap", 20)?
            .set_default("collections.max_pages", 5)?
            .add_source(File::with_name(config_path).required(false))
            // MARQUEE_SERVER__PORT=9000 -> server.port = 9000
            .add_source(
                Environment::with_prefix("MARQUEE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(500..=1000).contains(&self.carousel.transition_ms) {
            return Err(ConfigError::Message(format!(
                "carousel.transition_ms must be between 500 and 1000, got {}",
                self.carousel.transition_ms
            ))
            .into());
        }

        if self.embed.providers.is_empty() {
            return Err(
                ConfigError::Message("embed.providers must not be empty".to_string()).into(),
            );
        }

        if self.tmdb.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            tracing::warn!("TMDB API key not configured - catalog pages will render empty");
        }

        Ok(())
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};
        let ip: IpAddr = self.server.host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid host '{}', using 0.0.0.0", self.server.host);
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        });
        SocketAddr::new(ip, self.server.port)
    }
}
