//! Wire formats of the league API and their validation into typed models.
//!
//! Every field the API may omit is optional here. `validate` methods decide
//! which omissions are tolerable (defaulted or inherited from the request)
//! and which make the response unusable.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    ApexTier, Division, HighTierLeague, LeagueEntriesPage, LeagueEntry, MiniSeries, PlayerRef,
    PlayerSearchResult, Queue, RatedLadder, RatedLadderEntry, Summoner, SummonerBrief, Tier,
};

/// A response that decoded as JSON but does not satisfy the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{context}: {reason}")]
pub struct SchemaError {
    pub context: String,
    pub reason: String,
}

impl SchemaError {
    fn missing(context: &str, field: &str) -> Self {
        Self {
            context: context.to_string(),
            reason: format!("missing field `{}`", field),
        }
    }

    fn invalid(context: &str, reason: impl Into<String>) -> Self {
        Self {
            context: context.to_string(),
            reason: reason.into(),
        }
    }
}

/// Some endpoints wrap their payload in `{"data": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_negative(context: &str, field: &str, value: i64) -> Result<u32, SchemaError> {
    u32::try_from(value)
        .map_err(|_| SchemaError::invalid(context, format!("`{}` out of range: {}", field, value)))
}

// ── League entries ──────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMiniSeries {
    pub target: Option<u32>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub progress: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLeagueEntry {
    pub league_id: Option<String>,
    pub summoner_id: Option<String>,
    pub puuid: Option<String>,
    pub summoner_name: Option<String>,
    pub queue_type: Option<String>,
    pub tier: Option<String>,
    pub rank: Option<String>,
    pub league_points: Option<i32>,
    pub wins: Option<i64>,
    pub losses: Option<i64>,
    #[serde(default)]
    pub hot_streak: bool,
    #[serde(default)]
    pub veteran: bool,
    #[serde(default)]
    pub fresh_blood: bool,
    #[serde(default)]
    pub inactive: bool,
    pub mini_series: Option<WireMiniSeries>,
}

impl WireLeagueEntry {
    /// Validate one standing. `inherited_tier` fills in a missing `tier`,
    /// which apex leaderboards routinely omit per entry.
    pub fn validate(self, inherited_tier: Option<&Tier>) -> Result<LeagueEntry, SchemaError> {
        const CTX: &str = "league entry";

        let tier = match (non_empty(self.tier), inherited_tier) {
            (Some(name), _) => Tier::from_name(&name),
            (None, Some(tier)) => tier.clone(),
            (None, None) => return Err(SchemaError::missing(CTX, "tier")),
        };

        let division = if tier.has_divisions() {
            let parsed = self.rank.as_deref().and_then(Division::from_name);
            if parsed.is_none() && self.rank.is_some() {
                debug!("Ignoring unrecognised division {:?}", self.rank);
            }
            parsed
        } else {
            None
        };

        let league_points = self
            .league_points
            .ok_or_else(|| SchemaError::missing(CTX, "leaguePoints"))?;
        let wins = non_negative(CTX, "wins", self.wins.ok_or_else(|| SchemaError::missing(CTX, "wins"))?)?;
        let losses = non_negative(
            CTX,
            "losses",
            self.losses.ok_or_else(|| SchemaError::missing(CTX, "losses"))?,
        )?;

        let mini_series = self.mini_series.map(|m| MiniSeries {
            target: m.target.unwrap_or(m.wins + m.losses),
            wins: m.wins,
            losses: m.losses,
            progress: m.progress,
        });

        Ok(LeagueEntry {
            puuid: non_empty(self.puuid),
            summoner_id: non_empty(self.summoner_id),
            summoner_name: non_empty(self.summoner_name),
            queue_type: non_empty(self.queue_type),
            tier,
            division,
            league_points,
            wins,
            losses,
            hot_streak: self.hot_streak,
            veteran: self.veteran,
            fresh_blood: self.fresh_blood,
            inactive: self.inactive,
            mini_series,
        })
    }
}

/// Validate a list of standings, failing on the first bad entry.
pub fn validate_entries(
    entries: Vec<WireLeagueEntry>,
    inherited_tier: Option<&Tier>,
) -> Result<Vec<LeagueEntry>, SchemaError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, e)| {
            e.validate(inherited_tier).map_err(|err| SchemaError {
                context: format!("{} #{}", err.context, i),
                reason: err.reason,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireHighTierLeague {
    pub league_id: Option<String>,
    pub tier: Option<String>,
    pub name: Option<String>,
    pub queue: Option<String>,
    pub entries: Option<Vec<WireLeagueEntry>>,
}

impl WireHighTierLeague {
    pub fn validate(self, apex: ApexTier) -> Result<HighTierLeague, SchemaError> {
        let entries = self
            .entries
            .ok_or_else(|| SchemaError::missing("high tier league", "entries"))?;
        if let Some(sent) = non_empty(self.tier.clone()) {
            if Tier::from_name(&sent) != apex.tier() {
                debug!("League endpoint for {} reported tier {}", apex, sent);
            }
        }
        let tier = apex.tier();
        Ok(HighTierLeague {
            apex,
            league_id: non_empty(self.league_id),
            name: non_empty(self.name),
            queue: non_empty(self.queue),
            entries: validate_entries(entries, Some(&tier))?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireEntriesPage {
    pub entries: Option<Vec<WireLeagueEntry>>,
    pub page: Option<u32>,
    pub tier: Option<String>,
    pub division: Option<String>,
    pub has_more: Option<bool>,
}

impl WireEntriesPage {
    /// Missing page metadata falls back to what was requested.
    pub fn validate(
        self,
        tier: &Tier,
        division: Division,
        page: u32,
    ) -> Result<LeagueEntriesPage, SchemaError> {
        let entries = self
            .entries
            .ok_or_else(|| SchemaError::missing("league entries page", "entries"))?;
        Ok(LeagueEntriesPage {
            entries: validate_entries(entries, Some(tier))?,
            page: self.page.unwrap_or(page),
            tier: non_empty(self.tier)
                .map(|t| Tier::from_name(&t))
                .unwrap_or_else(|| tier.clone()),
            division: self
                .division
                .as_deref()
                .and_then(Division::from_name)
                .unwrap_or(division),
            has_more: self.has_more.unwrap_or(false),
        })
    }
}

// ── Players ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSummoner {
    pub id: Option<String>,
    pub account_id: Option<String>,
    pub puuid: Option<String>,
    pub name: Option<String>,
    pub profile_icon_id: Option<u32>,
    /// Milliseconds since the epoch
    pub revision_date: Option<i64>,
    pub summoner_level: Option<u32>,
}

impl WireSummoner {
    pub fn validate(self, requested_puuid: &str) -> Result<Summoner, SchemaError> {
        const CTX: &str = "summoner";
        let summoner_level = self
            .summoner_level
            .ok_or_else(|| SchemaError::missing(CTX, "summonerLevel"))?;
        Ok(Summoner {
            puuid: non_empty(self.puuid).unwrap_or_else(|| requested_puuid.to_string()),
            id: non_empty(self.id),
            account_id: non_empty(self.account_id),
            name: non_empty(self.name),
            profile_icon_id: self.profile_icon_id.unwrap_or(0),
            summoner_level,
            revision_date: self.revision_date.and_then(DateTime::<Utc>::from_timestamp_millis),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAccount {
    pub puuid: Option<String>,
    pub game_name: Option<String>,
    pub tag_line: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSummonerBrief {
    pub id: Option<String>,
    pub summoner_level: Option<u32>,
    pub profile_icon_id: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSearchResult {
    pub puuid: Option<String>,
    pub game_name: Option<String>,
    pub tag_line: Option<String>,
    pub account: Option<WireAccount>,
    pub summoner: Option<WireSummonerBrief>,
    pub league: Option<WireLeagueEntry>,
}

impl WireSearchResult {
    /// Identity fields may come flat or nested under `account`; the
    /// requested name and tag fill whatever is still missing.
    pub fn validate(
        self,
        requested_name: &str,
        requested_tag: Option<&str>,
    ) -> Result<PlayerSearchResult, SchemaError> {
        const CTX: &str = "player search";
        let account = self.account.unwrap_or(WireAccount {
            puuid: None,
            game_name: None,
            tag_line: None,
        });

        let puuid = non_empty(self.puuid)
            .or_else(|| non_empty(account.puuid))
            .ok_or_else(|| SchemaError::missing(CTX, "puuid"))?;
        let game_name = non_empty(self.game_name)
            .or_else(|| non_empty(account.game_name))
            .unwrap_or_else(|| requested_name.to_string());
        let tag_line = non_empty(self.tag_line)
            .or_else(|| non_empty(account.tag_line))
            .or_else(|| requested_tag.map(str::to_string))
            .unwrap_or_default();

        let league = match self.league {
            Some(wire) => Some(wire.validate(None).map_err(|e| SchemaError {
                context: format!("{} league", CTX),
                reason: e.reason,
            })?),
            None => None,
        };

        Ok(PlayerSearchResult {
            puuid,
            game_name,
            tag_line,
            summoner: self.summoner.map(|s| SummonerBrief {
                id: non_empty(s.id),
                summoner_level: s.summoner_level.unwrap_or(0),
                profile_icon_id: s.profile_icon_id.unwrap_or(0),
            }),
            league,
        })
    }
}

// ── Rated ladder ────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLadderEntry {
    pub summoner_id: Option<String>,
    pub summoner_name: Option<String>,
    pub puuid: Option<String>,
    pub rated_tier: Option<String>,
    pub rated_rating: Option<i32>,
    pub league_points: Option<i32>,
    pub wins: Option<i64>,
    /// Seconds since the epoch
    pub previous_update: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRatedLadder {
    pub queue: Option<String>,
    pub tier: Option<String>,
    #[serde(default)]
    pub entries: Vec<WireLadderEntry>,
}

impl WireRatedLadder {
    pub fn validate(self, queue: Queue) -> Result<RatedLadder, SchemaError> {
        if let Some(sent) = non_empty(self.queue) {
            if sent.parse::<Queue>().ok() != Some(queue) {
                return Err(SchemaError::invalid(
                    "rated ladder",
                    format!("requested {} but received {}", queue, sent),
                ));
            }
        }

        let entries = self
            .entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| -> Result<RatedLadderEntry, SchemaError> {
                let ctx = format!("rated ladder entry #{}", i);
                let rated_rating = e
                    .rated_rating
                    .ok_or_else(|| SchemaError::missing(&ctx, "ratedRating"))?;
                Ok(RatedLadderEntry {
                    player: PlayerRef {
                        summoner_id: non_empty(e.summoner_id),
                        summoner_name: non_empty(e.summoner_name),
                        puuid: non_empty(e.puuid),
                    },
                    rated_tier: non_empty(e.rated_tier),
                    rated_rating,
                    league_points: e.league_points.unwrap_or(0),
                    wins: non_negative(&ctx, "wins", e.wins.unwrap_or(0))?,
                    previous_update: e
                        .previous_update
                        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
                })
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Ok(RatedLadder {
            queue,
            tier: non_empty(self.tier),
            entries,
        })
    }
}
