//! Ranked standings.

use serde::{Deserialize, Serialize};

use super::{ApexTier, Division, Tier};

/// Promotion series progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniSeries {
    pub target: u32,
    pub wins: u32,
    pub losses: u32,
    /// Per-game marks as sent by the API, e.g. "WLN"
    pub progress: String,
}

/// A player's standing in one ranked queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueEntry {
    /// Player reference, when the API provides one
    pub puuid: Option<String>,

    /// Legacy summoner reference
    pub summoner_id: Option<String>,

    /// Display name (may be absent for freshly migrated accounts)
    pub summoner_name: Option<String>,

    /// Queue the standing belongs to (e.g., "RANKED_TFT")
    pub queue_type: Option<String>,

    pub tier: Tier,

    /// Always `None` for apex tiers
    pub division: Option<Division>,

    pub league_points: i32,
    pub wins: u32,
    pub losses: u32,

    /// On an active win streak
    pub hot_streak: bool,

    /// Long-tenured in this band
    pub veteran: bool,

    /// Newly placed into this band
    pub fresh_blood: bool,

    pub inactive: bool,

    pub mini_series: Option<MiniSeries>,
}

impl LeagueEntry {
    /// Name shown in tables.
    pub fn display_name(&self) -> &str {
        self.summoner_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unknown")
    }

    pub fn games_played(&self) -> u32 {
        self.wins.saturating_add(self.losses)
    }
}

/// Top-of-ladder leaderboard for one apex band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighTierLeague {
    pub apex: ApexTier,
    pub league_id: Option<String>,
    pub name: Option<String>,
    pub queue: Option<String>,
    /// Order as received from the API
    pub entries: Vec<LeagueEntry>,
}

/// One page of a divisioned leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueEntriesPage {
    pub entries: Vec<LeagueEntry>,
    pub page: u32,
    pub tier: Tier,
    pub division: Division,
    pub has_more: bool,
}
