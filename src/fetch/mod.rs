//! League API client.
//!
//! Issues GET requests to the fixed league API endpoints, classifies HTTP
//! failures and validates response bodies into typed models.

pub mod schema;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::models::{
    ApexTier, ApiHealth, Division, HighTierLeague, LeagueEntriesPage, LeagueEntry,
    PlayerSearchResult, Queue, RatedLadder, Summoner, Tier,
};
use schema::{
    Envelope, SchemaError, WireEntriesPage, WireHighTierLeague, WireLeagueEntry,
    WireRatedLadder, WireSearchResult, WireSummoner,
};

/// Errors that can occur while talking to the league API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Not found: {path}")]
    NotFound { path: String },

    #[error("Rate limited on {path}, retry after {retry_after_secs}s")]
    RateLimited { path: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    Schema(#[from] SchemaError),
}

impl FetchError {
    /// HTTP status behind this error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::NotFound { .. } => Some(404),
            FetchError::RateLimited { .. } => Some(429),
            FetchError::HttpStatus { status, .. } => Some(*status),
            FetchError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Source of league data. [`ApiClient`] is the production implementation.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Liveness probe.
    async fn health(&self) -> Result<ApiHealth, FetchError>;

    async fn summoner_by_puuid(&self, puuid: &str) -> Result<Summoner, FetchError>;

    /// Resolve a display name (and optional tag) to a player.
    async fn search_player(
        &self,
        game_name: &str,
        tag_line: Option<&str>,
    ) -> Result<PlayerSearchResult, FetchError>;

    async fn apex_league(&self, apex: ApexTier) -> Result<HighTierLeague, FetchError>;

    async fn league_entries(
        &self,
        tier: &Tier,
        division: Division,
        page: u32,
    ) -> Result<LeagueEntriesPage, FetchError>;

    async fn league_by_puuid(&self, puuid: &str) -> Result<Vec<LeagueEntry>, FetchError>;

    async fn rated_ladder(&self, queue: Queue) -> Result<RatedLadder, FetchError>;
}

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is joined onto
    pub base_url: Url,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl ClientConfig {
    /// Settings for the default local league API.
    pub fn local() -> Result<Self, FetchError> {
        crate::config::ApiConfig::default()
            .client_config()
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }
}

/// HTTP client for the league API.
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("tft-stats/0.1.0")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: Self::normalize_base(config.base_url),
        })
    }

    /// Create a client with default configuration.
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(ClientConfig::local()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Make sure relative joins append to the base path instead of replacing
    /// its last segment.
    fn normalize_base(mut url: Url) -> Url {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url
    }

    /// Build the URL for an endpoint path (no leading slash) and query pairs.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", path, e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// GET a URL and map non-success statuses onto [`FetchError`].
    async fn get(&self, url: &Url) -> Result<reqwest::Response, FetchError> {
        info!("Fetching {}", url);
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            warn!("Rate limited on {}", url.path());
            return Err(FetchError::RateLimited {
                path: url.path().to_string(),
                retry_after_secs: retry_after,
            });
        }

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                path: url.path().to_string(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let body = self.get(url).await?.bytes().await?;
        debug!("Received {} bytes from {}", body.len(), url.path());
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl StatsSource for ApiClient {
    async fn health(&self) -> Result<ApiHealth, FetchError> {
        let url = self.endpoint("healthz", &[])?;
        self.get(&url).await?;
        Ok(ApiHealth {
            checked_at: Utc::now(),
        })
    }

    async fn summoner_by_puuid(&self, puuid: &str) -> Result<Summoner, FetchError> {
        let url = self.endpoint("summoner", &[("puuid", puuid)])?;
        let wire: WireSummoner = self.get_json(&url).await?;
        Ok(wire.validate(puuid)?)
    }

    async fn search_player(
        &self,
        game_name: &str,
        tag_line: Option<&str>,
    ) -> Result<PlayerSearchResult, FetchError> {
        let mut query = vec![("gameName", game_name)];
        if let Some(tag) = tag_line.filter(|t| !t.is_empty()) {
            query.push(("tagLine", tag));
        }
        let url = self.endpoint("search/player", &query)?;
        let wire: Envelope<WireSearchResult> = self.get_json(&url).await?;
        Ok(wire.into_inner().validate(game_name, tag_line)?)
    }

    async fn apex_league(&self, apex: ApexTier) -> Result<HighTierLeague, FetchError> {
        let url = self.endpoint(&format!("league/{}", apex.slug()), &[])?;
        let wire: WireHighTierLeague = self.get_json(&url).await?;
        Ok(wire.validate(apex)?)
    }

    async fn league_entries(
        &self,
        tier: &Tier,
        division: Division,
        page: u32,
    ) -> Result<LeagueEntriesPage, FetchError> {
        let page_str = page.to_string();
        let url = self.endpoint(
            "league/entries",
            &[
                ("tier", tier.as_str()),
                ("division", division.as_str()),
                ("page", page_str.as_str()),
            ],
        )?;
        let wire: WireEntriesPage = self.get_json(&url).await?;
        Ok(wire.validate(tier, division, page)?)
    }

    async fn league_by_puuid(&self, puuid: &str) -> Result<Vec<LeagueEntry>, FetchError> {
        let url = self.endpoint("league/by-puuid", &[("puuid", puuid)])?;
        let wire: Vec<WireLeagueEntry> = self.get_json(&url).await?;
        Ok(schema::validate_entries(wire, None)?)
    }

    async fn rated_ladder(&self, queue: Queue) -> Result<RatedLadder, FetchError> {
        let url = self.endpoint("league/rated-ladder", &[("queue", queue.as_str())])?;
        let wire: WireRatedLadder = self.get_json(&url).await?;
        Ok(wire.validate(queue)?)
    }
}
