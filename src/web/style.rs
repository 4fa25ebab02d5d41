//! Static lookup tables for colours, icons and badges.

use crate::models::{ApexTier, Division, LeagueEntry, Tier};
use crate::notify::Level;

const DEFAULT_TIER_COLOR: &str = "text-gray-400";
const DEFAULT_TIER_ICON: &str = "🎯";

pub fn tier_color(tier: &Tier) -> &'static str {
    match tier {
        Tier::Iron => "text-gray-400",
        Tier::Bronze => "text-amber-700",
        Tier::Silver => "text-gray-300",
        Tier::Gold => "text-yellow-400",
        Tier::Platinum => "text-cyan-400",
        Tier::Emerald => "text-emerald-400",
        Tier::Diamond => "text-blue-400",
        Tier::Master => "text-purple-400",
        Tier::Grandmaster => "text-red-400",
        Tier::Challenger => "text-yellow-300",
        Tier::Unknown(_) => DEFAULT_TIER_COLOR,
    }
}

pub fn tier_icon(tier: &Tier) -> &'static str {
    match tier {
        Tier::Iron | Tier::Bronze => "🥉",
        Tier::Silver => "🥈",
        Tier::Gold => "🥇",
        Tier::Platinum | Tier::Diamond => "💎",
        Tier::Emerald => "💚",
        Tier::Master => "🟣",
        Tier::Grandmaster => "🔴",
        Tier::Challenger => "👑",
        Tier::Unknown(_) => DEFAULT_TIER_ICON,
    }
}

/// Card styling per apex band: (border/background, heading text).
pub fn apex_panel(apex: ApexTier) -> (&'static str, &'static str) {
    match apex {
        ApexTier::Challenger => ("bg-yellow-500/10 border-yellow-500/30", "text-yellow-300"),
        ApexTier::Grandmaster => ("bg-red-500/10 border-red-500/30", "text-red-300"),
        ApexTier::Master => ("bg-purple-500/10 border-purple-500/30", "text-purple-300"),
    }
}

/// Circled numeral, empty when there is no division.
pub fn division_icon(division: Option<Division>) -> &'static str {
    match division {
        Some(Division::I) => "①",
        Some(Division::II) => "②",
        Some(Division::III) => "③",
        Some(Division::IV) => "④",
        None => "",
    }
}

pub fn win_rate_color(win_rate: u32) -> &'static str {
    match win_rate {
        70.. => "text-green-400",
        60..=69 => "text-yellow-400",
        50..=59 => "text-orange-400",
        _ => "text-red-400",
    }
}

/// Medal for the podium, `None` from fourth place on. Positions start at 1.
pub fn position_medal(position: usize) -> Option<&'static str> {
    match position {
        1 => Some("🥇"),
        2 => Some("🥈"),
        3 => Some("🥉"),
        _ => None,
    }
}

pub fn position_label(position: usize) -> String {
    format!("#{}", position)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Badge {
    pub icon: &'static str,
    pub label: &'static str,
    pub class: &'static str,
}

const HOT_STREAK: Badge = Badge {
    icon: "🔥",
    label: "Hot streak",
    class: "bg-red-500/20 text-red-400",
};
const VETERAN: Badge = Badge {
    icon: "⭐",
    label: "Veteran",
    class: "bg-purple-500/20 text-purple-400",
};
const FRESH_BLOOD: Badge = Badge {
    icon: "🆕",
    label: "Fresh blood",
    class: "bg-green-500/20 text-green-400",
};
const INACTIVE: Badge = Badge {
    icon: "💤",
    label: "Inactive",
    class: "bg-gray-500/20 text-gray-400",
};

pub fn status_badges(entry: &LeagueEntry) -> Vec<Badge> {
    [
        (entry.hot_streak, HOT_STREAK),
        (entry.veteran, VETERAN),
        (entry.fresh_blood, FRESH_BLOOD),
        (entry.inactive, INACTIVE),
    ]
    .into_iter()
    .filter_map(|(set, badge)| set.then_some(badge))
    .collect()
}

/// Stats card palette: (card border/background, accent text).
pub fn card_color(color: &str) -> (&'static str, &'static str) {
    match color {
        "green" => ("border-green-500/30 bg-green-500/10", "text-green-400"),
        "yellow" => ("border-yellow-500/30 bg-yellow-500/10", "text-yellow-400"),
        "red" => ("border-red-500/30 bg-red-500/10", "text-red-400"),
        "purple" => ("border-purple-500/30 bg-purple-500/10", "text-purple-400"),
        _ => ("border-blue-500/30 bg-blue-500/10", "text-blue-400"),
    }
}

/// Toast styling: (container classes, icon).
pub fn toast_style(level: Level) -> (&'static str, &'static str) {
    match level {
        Level::Success => ("bg-green-500/20 border-green-500/50 text-green-300", "✅"),
        Level::Error => ("bg-red-500/20 border-red-500/50 text-red-300", "❌"),
        Level::Warning => ("bg-yellow-500/20 border-yellow-500/50 text-yellow-300", "⚠️"),
        Level::Info => ("bg-blue-500/20 border-blue-500/50 text-blue-300", "ℹ️"),
    }
}
