//! View models handed to the templates.
//!
//! Templates stay free of logic: every number is formatted and every
//! colour class chosen here.

use serde::Serialize;
use url::form_urlencoded;

use super::style::{self, Badge};
use crate::calculate::{format_tier_rank, win_rate};
use crate::models::{LeagueEntry, PlayerSearchResult, Queue, RatedLadderEntry, Summoner};
use crate::notify::Notification;
use crate::query::{ErrorKind, QueryError};

/// One leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct RankingRow {
    pub index: usize,
    pub position: String,
    pub medal: Option<&'static str>,
    pub name: String,
    pub queue_type: Option<String>,
    pub tier: String,
    pub tier_rank: String,
    pub tier_color: &'static str,
    pub tier_icon: &'static str,
    pub division_icon: &'static str,
    pub league_points: i32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: u32,
    pub win_rate_color: &'static str,
    pub badges: Vec<Badge>,
    pub mini_series: Option<String>,
    pub player_url: Option<String>,
}

impl RankingRow {
    /// `index` is 0-based; the position shown starts at 1.
    pub fn new(index: usize, entry: &LeagueEntry) -> Self {
        let rate = win_rate(entry.wins, entry.losses);
        Self {
            index,
            position: style::position_label(index + 1),
            medal: style::position_medal(index + 1),
            name: entry.display_name().to_string(),
            queue_type: entry.queue_type.clone(),
            tier: entry.tier.to_string(),
            tier_rank: format_tier_rank(&entry.tier, entry.division),
            tier_color: style::tier_color(&entry.tier),
            tier_icon: style::tier_icon(&entry.tier),
            division_icon: style::division_icon(entry.division),
            league_points: entry.league_points,
            wins: entry.wins,
            losses: entry.losses,
            win_rate: rate,
            win_rate_color: style::win_rate_color(rate),
            badges: style::status_badges(entry),
            mini_series: entry
                .mini_series
                .as_ref()
                .map(|s| format!("{} ({}W {}L)", s.progress, s.wins, s.losses)),
            player_url: entry.puuid.as_deref().map(player_url),
        }
    }
}

pub fn ranking_rows<'a>(entries: impl IntoIterator<Item = &'a LeagueEntry>) -> Vec<RankingRow> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, e)| RankingRow::new(i, e))
        .collect()
}

/// Link to a player's page with the id encoded as one path segment.
pub fn player_url(puuid: &str) -> String {
    let segment: String = form_urlencoded::byte_serialize(puuid.as_bytes()).collect();
    format!("/player/{}", segment.replace('+', "%20"))
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsCardView {
    pub key: String,
    pub title: String,
    pub value: String,
    pub icon: &'static str,
    pub card_class: &'static str,
    pub accent_class: &'static str,
    pub subtitle: Option<String>,
}

impl StatsCardView {
    pub fn new(
        key: &str,
        title: impl Into<String>,
        value: impl ToString,
        icon: &'static str,
        color: &str,
    ) -> Self {
        let (card_class, accent_class) = style::card_color(color);
        Self {
            key: key.to_string(),
            title: title.into(),
            value: value.to_string(),
            icon,
            card_class,
            accent_class,
            subtitle: None,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// "—" for missing aggregates.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "—".to_string(), |v| v.to_string())
}

/// Percentage with one decimal, "—" when undefined.
pub fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "—".to_string(), |v| format!("{:.1}%", v))
}

/// Error banner.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    /// "not-found", "rate-limited" or "error"
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub detail: Option<String>,
    pub retry_url: Option<String>,
    pub retry_label: &'static str,
}

impl ErrorView {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            title: title.into(),
            message: message.into(),
            detail: None,
            retry_url: None,
            retry_label: "Try again",
        }
    }

    pub fn retry(mut self, url: impl Into<String>) -> Self {
        self.retry_url = Some(url.into());
        self
    }

    /// Banner for a failed query, phrased by failure kind.
    pub fn from_query(error: &QueryError, what: &str) -> Self {
        match error.kind {
            ErrorKind::NotFound => Self {
                kind: "not-found",
                title: "Not found".to_string(),
                message: format!("{} not found.", what),
                detail: None,
                retry_url: None,
                retry_label: "Clear and try again",
            },
            ErrorKind::RateLimited => Self {
                kind: "rate-limited",
                title: "Rate limit".to_string(),
                message: "Too many requests. Please wait a moment and try again.".to_string(),
                detail: None,
                retry_url: None,
                retry_label: "Try again",
            },
            ErrorKind::Transient | ErrorKind::InvalidResponse => Self {
                detail: Some(error.message.clone()),
                ..Self::new("Error loading data", format!("Could not load {}.", what))
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToastView {
    pub id: String,
    pub level: &'static str,
    pub title: String,
    pub message: Option<String>,
    pub icon: &'static str,
    pub class: &'static str,
}

impl From<&Notification> for ToastView {
    fn from(n: &Notification) -> Self {
        let (class, icon) = style::toast_style(n.level);
        Self {
            id: n.id.to_string(),
            level: n.level.as_str(),
            title: n.title.clone(),
            message: n.message.clone(),
            icon,
            class,
        }
    }
}

/// Home page search result panel.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultView {
    pub riot_id: String,
    pub puuid: String,
    pub puuid_short: String,
    pub level: Option<u32>,
    pub player_url: String,
    pub league: Option<RankingRow>,
}

impl From<&PlayerSearchResult> for SearchResultView {
    fn from(r: &PlayerSearchResult) -> Self {
        Self {
            riot_id: r.riot_id(),
            puuid: r.puuid.clone(),
            puuid_short: r.puuid.chars().take(8).collect(),
            level: r.summoner.as_ref().map(|s| s.summoner_level),
            player_url: player_url(&r.puuid),
            league: r.league.as_ref().map(|l| RankingRow::new(0, l)),
        }
    }
}

impl SearchResultView {
    /// Result panel for a lookup by player id. Shows the ranked TFT standing
    /// when there is one, otherwise the first standing listed.
    pub fn from_profile(summoner: &Summoner, standings: &[LeagueEntry]) -> Self {
        let league = standings
            .iter()
            .find(|e| e.queue_type.as_deref() == Some(Queue::RankedTft.as_str()))
            .or_else(|| standings.first());
        Self {
            riot_id: summoner.display_name().to_string(),
            puuid: summoner.puuid.clone(),
            puuid_short: summoner.puuid.chars().take(8).collect(),
            level: Some(summoner.summoner_level),
            player_url: player_url(&summoner.puuid),
            league: league.map(|l| RankingRow::new(0, l)),
        }
    }
}

/// One rated ladder row.
#[derive(Debug, Clone, Serialize)]
pub struct LadderRow {
    pub index: usize,
    pub position: String,
    pub medal: Option<&'static str>,
    pub name: String,
    pub rated_tier: Option<String>,
    pub rating: i32,
    pub league_points: i32,
    pub wins: u32,
    pub last_update: Option<String>,
    pub player_url: Option<String>,
}

impl LadderRow {
    pub fn new(index: usize, entry: &RatedLadderEntry) -> Self {
        Self {
            index,
            position: style::position_label(index + 1),
            medal: style::position_medal(index + 1),
            name: entry.player.display_name().to_string(),
            rated_tier: entry.rated_tier.clone(),
            rating: entry.rated_rating,
            league_points: entry.league_points,
            wins: entry.wins,
            last_update: entry
                .previous_update
                .map(|t| t.format("%Y-%m-%d").to_string()),
            player_url: entry.player.puuid.as_deref().map(player_url),
        }
    }
}
