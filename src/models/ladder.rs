//! Rated ladder standings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Queue;

/// Who a ladder row belongs to. Any of the references may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerRef {
    pub summoner_id: Option<String>,
    pub summoner_name: Option<String>,
    pub puuid: Option<String>,
}

impl PlayerRef {
    pub fn display_name(&self) -> &str {
        self.summoner_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedLadderEntry {
    pub player: PlayerRef,
    /// Ladder colour band (e.g., "ORANGE"); free text from the API
    pub rated_tier: Option<String>,
    pub rated_rating: i32,
    pub league_points: i32,
    pub wins: u32,
    pub previous_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedLadder {
    pub queue: Queue,
    pub tier: Option<String>,
    pub entries: Vec<RatedLadderEntry>,
}
