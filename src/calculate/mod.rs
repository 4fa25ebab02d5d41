//! Statistics calculation engine.
//!
//! Pure functions over league data:
//! - Win rates
//! - Rank ordering of mixed standings
//! - Name filtering for leaderboards
//! - Aggregates for the analytics and leagues pages (see [`aggregate`])

pub mod aggregate;

pub use aggregate::*;

use std::cmp::Ordering;

use crate::models::{Division, LeagueEntry, RatedLadderEntry, Tier};

/// Win percentage rounded half-up, 0 when no games were played.
pub fn win_rate(wins: u32, losses: u32) -> u32 {
    let total = u64::from(wins) + u64::from(losses);
    if total == 0 {
        return 0;
    }
    // round(100w/t) == floor((200w + t) / 2t)
    ((200 * u64::from(wins) + total) / (2 * total)) as u32
}

/// Unrounded win percentage, 0.0 when no games were played.
pub fn win_rate_exact(wins: u32, losses: u32) -> f64 {
    let total = u64::from(wins) + u64::from(losses);
    if total == 0 {
        0.0
    } else {
        f64::from(wins) * 100.0 / total as f64
    }
}

/// Anything that carries a rank position.
pub trait RankKey {
    fn tier(&self) -> &Tier;
    fn division(&self) -> Option<Division>;
    fn league_points(&self) -> i32;
}

impl RankKey for LeagueEntry {
    fn tier(&self) -> &Tier {
        &self.tier
    }

    fn division(&self) -> Option<Division> {
        self.division
    }

    fn league_points(&self) -> i32 {
        self.league_points
    }
}

impl<T: RankKey + ?Sized> RankKey for &T {
    fn tier(&self) -> &Tier {
        (**self).tier()
    }

    fn division(&self) -> Option<Division> {
        (**self).division()
    }

    fn league_points(&self) -> i32 {
        (**self).league_points()
    }
}

/// Leaderboard order. `Less` means `a` ranks above `b`.
///
/// Tier weight first, then division when both sides carry one and the tier
/// is divisioned, then league points; all descending.
pub fn compare_ranks<A: RankKey, B: RankKey>(a: &A, b: &B) -> Ordering {
    let tier = b.tier().weight().cmp(&a.tier().weight());
    if tier != Ordering::Equal {
        return tier;
    }

    if a.tier().has_divisions() {
        if let (Some(da), Some(db)) = (a.division(), b.division()) {
            let division = db.weight().cmp(&da.weight());
            if division != Ordering::Equal {
                return division;
            }
        }
    }

    b.league_points().cmp(&a.league_points())
}

/// Stable sort into leaderboard order.
pub fn sort_by_rank<T: RankKey>(entries: &mut [T]) {
    entries.sort_by(|a, b| compare_ranks(a, b));
}

/// Entries whose summoner name contains `term`, ignoring case.
///
/// A blank term keeps everything; nameless entries never match otherwise.
pub fn filter_by_name<'a, I>(entries: I, term: &str) -> Vec<&'a LeagueEntry>
where
    I: IntoIterator<Item = &'a LeagueEntry>,
{
    let needle = term.trim().to_lowercase();
    entries
        .into_iter()
        .filter(|e| {
            needle.is_empty()
                || e.summoner_name
                    .as_deref()
                    .map(|n| n.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .collect()
}

/// "GOLD II", or just the tier for apex bands and missing divisions.
pub fn format_tier_rank(tier: &Tier, division: Option<Division>) -> String {
    match division {
        Some(d) if tier.has_divisions() => format!("{} {}", tier, d),
        _ => tier.to_string(),
    }
}

/// Rated ladder order: rating descending, then league points descending.
pub fn sort_ladder(entries: &mut [RatedLadderEntry]) {
    entries.sort_by(|a, b| {
        b.rated_rating
            .cmp(&a.rated_rating)
            .then_with(|| b.league_points.cmp(&a.league_points))
    });
}
