//! Aggregate statistics over loaded standings.
//!
//! Every aggregate answers `None` for an empty population instead of
//! dividing by zero.

use serde::Serialize;

use super::win_rate_exact;
use crate::models::{ApexTier, HighTierLeague, LeagueEntry, RatedLadderEntry};

fn mean(sum: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| sum / count as f64)
}

/// Rounded mean league points.
pub fn average_league_points(entries: &[LeagueEntry]) -> Option<i64> {
    let sum: f64 = entries.iter().map(|e| f64::from(e.league_points)).sum();
    mean(sum, entries.len()).map(|m| m.round() as i64)
}

pub fn max_league_points(entries: &[LeagueEntry]) -> Option<i32> {
    entries.iter().map(|e| e.league_points).max()
}

pub fn min_league_points(entries: &[LeagueEntry]) -> Option<i32> {
    entries.iter().map(|e| e.league_points).min()
}

/// Rounded mean of the per-player win rates.
pub fn average_win_rate(entries: &[LeagueEntry]) -> Option<u32> {
    let sum: f64 = entries.iter().map(|e| win_rate_exact(e.wins, e.losses)).sum();
    mean(sum, entries.len()).map(|m| m.round() as u32)
}

/// Best individual win rate, unrounded.
pub fn max_win_rate(entries: &[LeagueEntry]) -> Option<f64> {
    entries
        .iter()
        .map(|e| win_rate_exact(e.wins, e.losses))
        .fold(None, |best, wr| match best {
            Some(b) if b >= wr => Some(b),
            _ => Some(wr),
        })
}

/// Percentage of `count` in `total`, `None` when `total` is zero.
pub fn share(count: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| count as f64 * 100.0 / total as f64)
}

/// How many players carry each status flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub hot_streak: usize,
    pub veteran: usize,
    pub fresh_blood: usize,
    pub inactive: usize,
}

impl StatusCounts {
    pub fn from_entries(entries: &[LeagueEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut c, e| {
            c.hot_streak += usize::from(e.hot_streak);
            c.veteran += usize::from(e.veteran);
            c.fresh_blood += usize::from(e.fresh_blood);
            c.inactive += usize::from(e.inactive);
            c
        })
    }
}

/// League-point range with its population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LpBucket {
    pub label: &'static str,
    pub count: usize,
}

/// Players per league-point range: 0-99, 100-299, 300-499, 500+.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LpDistribution {
    pub buckets: Vec<LpBucket>,
}

impl LpDistribution {
    const RANGES: [(&'static str, i32); 4] =
        [("0-99", 100), ("100-299", 300), ("300-499", 500), ("500+", i32::MAX)];

    pub fn from_entries(entries: &[LeagueEntry]) -> Self {
        let mut counts = [0usize; 4];
        for e in entries {
            let idx = Self::RANGES
                .iter()
                .position(|(_, upper)| e.league_points < *upper)
                .unwrap_or(Self::RANGES.len() - 1);
            counts[idx] += 1;
        }
        Self {
            buckets: Self::RANGES
                .iter()
                .zip(counts)
                .map(|(&(label, _), count)| LpBucket { label, count })
                .collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    /// Fullest bucket; the lower range wins a tie. `None` when all are empty.
    pub fn most_populated(&self) -> Option<&LpBucket> {
        self.buckets
            .iter()
            .filter(|b| b.count > 0)
            .fold(None, |best: Option<&LpBucket>, b| match best {
                Some(top) if top.count >= b.count => Some(top),
                _ => Some(b),
            })
    }
}

/// Players per loaded apex band, highest band first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierDistribution {
    pub bands: Vec<(ApexTier, usize)>,
}

impl TierDistribution {
    pub fn from_leagues(leagues: &[&HighTierLeague]) -> Self {
        let mut bands: Vec<(ApexTier, usize)> =
            leagues.iter().map(|l| (l.apex, l.entries.len())).collect();
        bands.sort_by_key(|(apex, _)| std::cmp::Reverse(apex.tier().weight()));
        Self { bands }
    }

    pub fn total(&self) -> usize {
        self.bands.iter().map(|(_, n)| n).sum()
    }

    pub fn count(&self, apex: ApexTier) -> Option<usize> {
        self.bands.iter().find(|(a, _)| *a == apex).map(|(_, n)| *n)
    }
}

/// Everything the analytics page shows about the apex bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighTierAnalytics {
    pub total_players: usize,
    pub average_lp: Option<i64>,
    pub max_lp: Option<i32>,
    pub min_lp: Option<i32>,
    pub average_win_rate: Option<u32>,
    pub max_win_rate: Option<f64>,
    pub status: StatusCounts,
    pub lp_distribution: LpDistribution,
    pub tier_distribution: TierDistribution,
    /// Share of players not flagged inactive, rounded
    pub activity_rate: Option<u32>,
    pub lp_spread: Option<i32>,
}

impl HighTierAnalytics {
    pub fn compute(leagues: &[&HighTierLeague]) -> Self {
        let all: Vec<LeagueEntry> = leagues
            .iter()
            .flat_map(|l| l.entries.iter().cloned())
            .collect();
        let status = StatusCounts::from_entries(&all);
        let max_lp = max_league_points(&all);
        let min_lp = min_league_points(&all);

        Self {
            total_players: all.len(),
            average_lp: average_league_points(&all),
            max_lp,
            min_lp,
            average_win_rate: average_win_rate(&all),
            max_win_rate: max_win_rate(&all),
            status,
            lp_distribution: LpDistribution::from_entries(&all),
            tier_distribution: TierDistribution::from_leagues(leagues),
            activity_rate: share(all.len() - status.inactive, all.len())
                .map(|s| s.round() as u32),
            lp_spread: max_lp.zip(min_lp).map(|(max, min)| max - min),
        }
    }
}

/// Summary of the top rows of one apex band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandSummary {
    pub apex: ApexTier,
    pub shown: usize,
    pub top_lp: Option<i32>,
    pub average_lp: Option<i64>,
}

/// Stats cards for the leagues page, computed from the top-N of each band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopTierStats {
    pub bands: Vec<BandSummary>,
    pub total_shown: usize,
    pub top_lp: Option<i32>,
    /// Mean over every shown row, not over the band means
    pub average_lp: Option<i64>,
}

impl TopTierStats {
    pub fn compute(leagues: &[&HighTierLeague], top_per_band: usize) -> Self {
        let mut shown_lp = 0f64;
        let bands: Vec<BandSummary> = leagues
            .iter()
            .map(|l| {
                let mut top: Vec<&LeagueEntry> = l.entries.iter().collect();
                super::sort_by_rank(&mut top);
                top.truncate(top_per_band);
                let lps: Vec<i32> = top.iter().map(|e| e.league_points).collect();
                shown_lp += lps.iter().map(|&lp| f64::from(lp)).sum::<f64>();
                BandSummary {
                    apex: l.apex,
                    shown: top.len(),
                    top_lp: lps.iter().copied().max(),
                    average_lp: mean(lps.iter().map(|&lp| f64::from(lp)).sum(), lps.len())
                        .map(|m| m.round() as i64),
                }
            })
            .collect();

        let total_shown = bands.iter().map(|b| b.shown).sum();
        Self {
            total_shown,
            top_lp: bands.iter().filter_map(|b| b.top_lp).max(),
            average_lp: mean(shown_lp, total_shown).map(|m| m.round() as i64),
            bands,
        }
    }
}

/// Rated ladder summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LadderStats {
    pub total_players: usize,
    pub average_rating: Option<i64>,
    pub max_rating: Option<i32>,
    pub average_wins: Option<i64>,
}

impl LadderStats {
    pub fn compute(entries: &[RatedLadderEntry]) -> Self {
        let rating_sum: f64 = entries.iter().map(|e| f64::from(e.rated_rating)).sum();
        let wins_sum: f64 = entries.iter().map(|e| f64::from(e.wins)).sum();
        Self {
            total_players: entries.len(),
            average_rating: mean(rating_sum, entries.len()).map(|m| m.round() as i64),
            max_rating: entries.iter().map(|e| e.rated_rating).max(),
            average_wins: mean(wins_sum, entries.len()).map(|m| m.round() as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::entry;
    use crate::models::{PlayerRef, Tier};
    use pretty_assertions::assert_eq;

    fn league(apex: ApexTier, lps: &[i32]) -> HighTierLeague {
        HighTierLeague {
            apex,
            league_id: None,
            name: None,
            queue: None,
            entries: lps
                .iter()
                .enumerate()
                .map(|(i, lp)| entry(&format!("{}{}", apex.slug(), i), apex.tier(), None, *lp))
                .collect(),
        }
    }

    #[test]
    fn test_empty_aggregates_are_none() {
        let empty: Vec<LeagueEntry> = Vec::new();
        assert_eq!(average_league_points(&empty), None);
        assert_eq!(max_league_points(&empty), None);
        assert_eq!(min_league_points(&empty), None);
        assert_eq!(average_win_rate(&empty), None);
        assert_eq!(max_win_rate(&empty), None);
        assert_eq!(share(3, 0), None);
    }

    #[test]
    fn test_league_point_aggregates() {
        let v = vec![
            entry("a", Tier::Master, None, 100),
            entry("b", Tier::Master, None, 250),
            entry("c", Tier::Master, None, 51),
        ];
        assert_eq!(average_league_points(&v), Some(134));
        assert_eq!(max_league_points(&v), Some(250));
        assert_eq!(min_league_points(&v), Some(51));
    }

    #[test]
    fn test_win_rate_aggregates() {
        let mut a = entry("a", Tier::Master, None, 0);
        a.wins = 3;
        a.losses = 1;
        let mut b = entry("b", Tier::Master, None, 0);
        b.wins = 0;
        b.losses = 0;
        let v = vec![a, b];
        // (75 + 0) / 2 = 37.5
        assert_eq!(average_win_rate(&v), Some(38));
        assert_eq!(max_win_rate(&v), Some(75.0));
    }

    #[test]
    fn test_status_counts() {
        let mut a = entry("a", Tier::Master, None, 0);
        a.hot_streak = true;
        a.veteran = true;
        let mut b = entry("b", Tier::Master, None, 0);
        b.inactive = true;
        b.hot_streak = true;
        let counts = StatusCounts::from_entries(&[a, b]);
        assert_eq!(
            counts,
            StatusCounts {
                hot_streak: 2,
                veteran: 1,
                fresh_blood: 0,
                inactive: 1
            }
        );
    }

    #[test]
    fn test_lp_distribution_bucket_edges() {
        let v: Vec<LeagueEntry> = [0, 99, 100, 299, 300, 499, 500, 2000, -5]
            .iter()
            .map(|lp| entry("x", Tier::Master, None, *lp))
            .collect();
        let dist = LpDistribution::from_entries(&v);
        let counts: Vec<(&str, usize)> = dist.buckets.iter().map(|b| (b.label, b.count)).collect();
        assert_eq!(
            counts,
            vec![("0-99", 3), ("100-299", 2), ("300-499", 2), ("500+", 2)]
        );
        assert_eq!(dist.total(), 9);
        assert_eq!(dist.most_populated().map(|b| b.label), Some("0-99"));
    }

    #[test]
    fn test_lp_distribution_empty_has_no_peak() {
        let dist = LpDistribution::from_entries(&[]);
        assert_eq!(dist.total(), 0);
        assert!(dist.most_populated().is_none());
    }

    #[test]
    fn test_high_tier_analytics() {
        let chall = league(ApexTier::Challenger, &[1200, 900]);
        let mut master = league(ApexTier::Master, &[50, 150, 320]);
        master.entries[0].inactive = true;

        let analytics = HighTierAnalytics::compute(&[&master, &chall]);
        assert_eq!(analytics.total_players, 5);
        assert_eq!(analytics.max_lp, Some(1200));
        assert_eq!(analytics.min_lp, Some(50));
        assert_eq!(analytics.lp_spread, Some(1150));
        assert_eq!(analytics.activity_rate, Some(80));
        assert_eq!(analytics.average_win_rate, Some(50));
        assert_eq!(
            analytics.tier_distribution.bands,
            vec![(ApexTier::Challenger, 2), (ApexTier::Master, 3)]
        );
        assert_eq!(analytics.tier_distribution.count(ApexTier::Grandmaster), None);
    }

    #[test]
    fn test_high_tier_analytics_empty() {
        let analytics = HighTierAnalytics::compute(&[]);
        assert_eq!(analytics.total_players, 0);
        assert_eq!(analytics.average_lp, None);
        assert_eq!(analytics.activity_rate, None);
        assert_eq!(analytics.lp_spread, None);
    }

    #[test]
    fn test_top_tier_stats_takes_top_n_by_rank() {
        let gm = league(ApexTier::Grandmaster, &[300, 700, 500, 100]);
        let stats = TopTierStats::compute(&[&gm], 2);
        assert_eq!(stats.total_shown, 2);
        assert_eq!(stats.top_lp, Some(700));
        assert_eq!(stats.bands[0].average_lp, Some(600));
        assert_eq!(stats.average_lp, Some(600));
    }

    #[test]
    fn test_ladder_stats() {
        let row = |rating: i32, wins: u32| RatedLadderEntry {
            player: PlayerRef::default(),
            rated_tier: None,
            rated_rating: rating,
            league_points: 0,
            wins,
            previous_update: None,
        };
        let stats = LadderStats::compute(&[row(1000, 10), row(1501, 21)]);
        assert_eq!(stats.total_players, 2);
        assert_eq!(stats.max_rating, Some(1501));
        assert_eq!(stats.average_rating, Some(1251));
        assert_eq!(stats.average_wins, Some(16));

        let empty = LadderStats::compute(&[]);
        assert_eq!(empty.average_rating, None);
        assert_eq!(empty.max_rating, None);
    }
}
