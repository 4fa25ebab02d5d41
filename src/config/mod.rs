//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::fetch::ClientConfig;
use crate::query::RetryPolicy;

/// League API base URL used when neither the config file nor the
/// environment provides one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "TFT_STATS_API_URL";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Durations are written as "30m", "5s", "250ms".
pub(crate) mod duration_str {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&crate::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        crate::parse_duration(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid duration: {:?}", raw)))
    }
}

/// League API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the league API
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout", with = "duration_str")]
    pub timeout: Duration,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("tft-stats/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Client settings for [`crate::fetch::ApiClient`].
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let base_url = Url::parse(&self.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("api.base_url {:?}: {}", self.base_url, e))
        })?;
        Ok(ClientConfig {
            base_url,
            timeout: self.timeout,
            user_agent: self.user_agent.clone(),
        })
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// How long a page waits for its data before rendering a loading state
    #[serde(default = "default_render_budget", with = "duration_str")]
    pub render_budget: Duration,

    /// Reload interval of loading pages, in seconds
    #[serde(default = "default_loading_refresh")]
    pub loading_refresh_secs: u32,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_render_budget() -> Duration {
    Duration::from_secs(8)
}

fn default_loading_refresh() -> u32 {
    2
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            render_budget: default_render_budget(),
            loading_refresh_secs: default_loading_refresh(),
        }
    }
}

/// How long each kind of response stays fresh in the query cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_health_stale", with = "duration_str")]
    pub health: Duration,

    #[serde(default = "default_five_minutes", with = "duration_str")]
    pub summoner: Duration,

    #[serde(default = "default_five_minutes", with = "duration_str")]
    pub player_search: Duration,

    #[serde(default = "default_thirty_minutes", with = "duration_str")]
    pub apex_leagues: Duration,

    #[serde(default = "default_thirty_minutes", with = "duration_str")]
    pub league_entries: Duration,

    #[serde(default = "default_one_hour", with = "duration_str")]
    pub league_by_puuid: Duration,

    #[serde(default = "default_one_hour", with = "duration_str")]
    pub rated_ladder: Duration,

    /// How long a settled entry is kept once it has gone stale
    #[serde(default = "default_five_minutes", with = "duration_str")]
    pub retention: Duration,
}

fn default_health_stale() -> Duration {
    Duration::from_secs(30)
}

fn default_five_minutes() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_thirty_minutes() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_one_hour() -> Duration {
    Duration::from_secs(60 * 60)
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            health: default_health_stale(),
            summoner: default_five_minutes(),
            player_search: default_five_minutes(),
            apex_leagues: default_thirty_minutes(),
            league_entries: default_thirty_minutes(),
            league_by_puuid: default_one_hour(),
            rated_ladder: default_one_hour(),
            retention: default_five_minutes(),
        }
    }
}

/// Toast notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How long a toast stays visible
    #[serde(default = "default_toast_duration", with = "duration_str")]
    pub toast_duration: Duration,

    /// Most toasts shown at once; older ones are dropped first
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
}

fn default_toast_duration() -> Duration {
    Duration::from_secs(5)
}

fn default_max_visible() -> usize {
    5
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            toast_duration: default_toast_duration(),
            max_visible: default_max_visible(),
        }
    }
}

/// Leaderboard presentation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    /// Rows taken from the top of each apex band
    #[serde(default = "default_top_per_band")]
    pub top_per_band: usize,
}

fn default_top_per_band() -> usize {
    10
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            top_per_band: default_top_per_band(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            api: ApiConfig::default(),
            server: ServerConfig::default(),
            retry: RetryPolicy::default(),
            cache: CacheConfig::default(),
            notifications: NotificationConfig::default(),
            leaderboard: LeaderboardConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists (defaults otherwise), then apply
    /// environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) if p.exists() => {
                let contents = std::fs::read_to_string(p)?;
                toml::from_str(&contents)?
            }
            _ => AppConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.client_config()?;

        if self.api.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }

        if self.retry.backoff_max < self.retry.backoff_base {
            return Err(ConfigError::ValidationError(
                "retry.backoff_max must not be below retry.backoff_base".to_string(),
            ));
        }

        if self.leaderboard.top_per_band == 0 {
            return Err(ConfigError::ValidationError(
                "leaderboard.top_per_band must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
