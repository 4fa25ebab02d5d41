//! Player identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LeagueEntry;

/// Player profile as returned by the summoner lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summoner {
    pub puuid: String,
    pub id: Option<String>,
    pub account_id: Option<String>,
    pub name: Option<String>,
    pub profile_icon_id: u32,
    pub summoner_level: u32,
    pub revision_date: Option<DateTime<Utc>>,
}

impl Summoner {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unknown")
    }
}

/// Profile fields bundled with a name search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummonerBrief {
    pub id: Option<String>,
    pub summoner_level: u32,
    pub profile_icon_id: u32,
}

/// A display name + tag resolved to a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSearchResult {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
    pub summoner: Option<SummonerBrief>,
    /// Ranked standing, absent for unranked players
    pub league: Option<LeagueEntry>,
}

impl PlayerSearchResult {
    /// `Name#TAG`
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }
}

/// Successful liveness probe of the league API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiHealth {
    pub checked_at: DateTime<Utc>,
}
