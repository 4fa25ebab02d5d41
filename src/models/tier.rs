//! Rank bands, divisions and queues.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named rank band.
///
/// Names the API sends that this build does not recognise are kept verbatim
/// in [`Tier::Unknown`] and rank below every known band.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
    Unknown(String),
}

impl Tier {
    /// Bands that are split into divisions, lowest first.
    pub const DIVISIONED: [Tier; 7] = [
        Tier::Iron,
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Emerald,
        Tier::Diamond,
    ];

    /// Parse an API tier name. Matching ignores case and surrounding whitespace.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "IRON" => Tier::Iron,
            "BRONZE" => Tier::Bronze,
            "SILVER" => Tier::Silver,
            "GOLD" => Tier::Gold,
            "PLATINUM" => Tier::Platinum,
            "EMERALD" => Tier::Emerald,
            "DIAMOND" => Tier::Diamond,
            "MASTER" => Tier::Master,
            "GRANDMASTER" => Tier::Grandmaster,
            "CHALLENGER" => Tier::Challenger,
            _ => Tier::Unknown(name.trim().to_string()),
        }
    }

    /// Upper-case API name.
    pub fn as_str(&self) -> &str {
        match self {
            Tier::Iron => "IRON",
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Emerald => "EMERALD",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Challenger => "CHALLENGER",
            Tier::Unknown(name) => name,
        }
    }

    /// Ordering weight. Divisioned bands occupy 0..=6, apex bands 7..=9,
    /// unknown names sit below Iron.
    pub fn weight(&self) -> i32 {
        match self {
            Tier::Iron => 0,
            Tier::Bronze => 1,
            Tier::Silver => 2,
            Tier::Gold => 3,
            Tier::Platinum => 4,
            Tier::Emerald => 5,
            Tier::Diamond => 6,
            Tier::Master => 7,
            Tier::Grandmaster => 8,
            Tier::Challenger => 9,
            Tier::Unknown(_) => -1,
        }
    }

    /// Whether standings in this band carry a division.
    pub fn has_divisions(&self) -> bool {
        !self.is_apex()
    }

    /// Master, Grandmaster or Challenger.
    pub fn is_apex(&self) -> bool {
        matches!(self, Tier::Master | Tier::Grandmaster | Tier::Challenger)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Tier::Unknown(_))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Tier {
    fn from(s: String) -> Self {
        Tier::from_name(&s)
    }
}

impl From<&str> for Tier {
    fn from(s: &str) -> Self {
        Tier::from_name(s)
    }
}

impl From<Tier> for String {
    fn from(t: Tier) -> Self {
        t.as_str().to_string()
    }
}

/// The three fixed top-of-ladder leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApexTier {
    Challenger,
    Grandmaster,
    Master,
}

impl ApexTier {
    /// Highest band first.
    pub const ALL: [ApexTier; 3] = [ApexTier::Challenger, ApexTier::Grandmaster, ApexTier::Master];

    /// Path segment under `/league/`, also used in page filters.
    pub fn slug(&self) -> &'static str {
        match self {
            ApexTier::Challenger => "challenger",
            ApexTier::Grandmaster => "grandmaster",
            ApexTier::Master => "master",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApexTier::Challenger => "Challenger",
            ApexTier::Grandmaster => "Grandmaster",
            ApexTier::Master => "Master",
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            ApexTier::Challenger => Tier::Challenger,
            ApexTier::Grandmaster => Tier::Grandmaster,
            ApexTier::Master => Tier::Master,
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        ApexTier::ALL
            .into_iter()
            .find(|t| t.slug().eq_ignore_ascii_case(slug.trim()))
    }
}

impl fmt::Display for ApexTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sub-rank within a divisioned band. Declaration order is rank order, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Division {
    IV,
    III,
    II,
    I,
}

impl Division {
    /// Lowest first.
    pub const ALL: [Division; 4] = [Division::IV, Division::III, Division::II, Division::I];

    pub fn as_str(&self) -> &'static str {
        match self {
            Division::IV => "IV",
            Division::III => "III",
            Division::II => "II",
            Division::I => "I",
        }
    }

    /// Ordering weight, 0 for IV up to 3 for I.
    pub fn weight(&self) -> i32 {
        match self {
            Division::IV => 0,
            Division::III => 1,
            Division::II => 2,
            Division::I => 3,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "IV" | "4" => Some(Division::IV),
            "III" | "3" => Some(Division::III),
            "II" | "2" => Some(Division::II),
            "I" | "1" => Some(Division::I),
            _ => None,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Division {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Division::from_name(s).ok_or_else(|| format!("unknown division: {}", s))
    }
}

/// Rated-ladder queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Queue {
    #[default]
    #[serde(rename = "RANKED_TFT")]
    RankedTft,
}

impl Queue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Queue::RankedTft => "RANKED_TFT",
        }
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Queue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RANKED_TFT" => Ok(Queue::RankedTft),
            other => Err(format!("unknown queue: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_name_is_case_insensitive() {
        assert_eq!(Tier::from_name("gold"), Tier::Gold);
        assert_eq!(Tier::from_name(" CHALLENGER "), Tier::Challenger);
        assert_eq!(
            Tier::from_name("MYTHIC"),
            Tier::Unknown("MYTHIC".to_string())
        );
    }

    #[test]
    fn test_tier_weights_are_strictly_increasing() {
        let ordered = [
            Tier::Unknown("X".into()),
            Tier::Iron,
            Tier::Bronze,
            Tier::Silver,
            Tier::Gold,
            Tier::Platinum,
            Tier::Emerald,
            Tier::Diamond,
            Tier::Master,
            Tier::Grandmaster,
            Tier::Challenger,
        ];
        for pair in ordered.windows(2) {
            assert!(pair[0].weight() < pair[1].weight(), "{:?}", pair);
        }
    }

    #[test]
    fn test_apex_tiers_above_all_divisioned() {
        let lowest_apex = ApexTier::ALL.iter().map(|t| t.tier().weight()).min();
        let highest_divisioned = Tier::DIVISIONED.iter().map(Tier::weight).max();
        assert!(lowest_apex > highest_divisioned);
        assert!(Tier::DIVISIONED.iter().all(Tier::has_divisions));
        assert!(ApexTier::ALL.iter().all(|t| !t.tier().has_divisions()));
    }

    #[test]
    fn test_tier_serde_round_trips_unknown_names() {
        let json = serde_json::to_string(&Tier::Unknown("MYTHIC".into())).unwrap();
        assert_eq!(json, "\"MYTHIC\"");
        let parsed: Tier = serde_json::from_str("\"DIAMOND\"").unwrap();
        assert_eq!(parsed, Tier::Diamond);
    }

    #[test]
    fn test_division_order() {
        assert!(Division::I > Division::II);
        assert!(Division::IV < Division::III);
        assert_eq!(Division::from_name("ii"), Some(Division::II));
        assert_eq!(Division::from_name("V"), None);
    }

    #[test]
    fn test_apex_from_slug() {
        assert_eq!(ApexTier::from_slug("Grandmaster"), Some(ApexTier::Grandmaster));
        assert_eq!(ApexTier::from_slug("all"), None);
    }

    #[test]
    fn test_queue_parse() {
        assert_eq!("ranked_tft".parse::<Queue>(), Ok(Queue::RankedTft));
        assert!("RANKED_SOLO_5x5".parse::<Queue>().is_err());
    }
}
