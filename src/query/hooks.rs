//! One query per league API endpoint.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::cache::QueryCache;
use super::retry::{run_with_retry, RetryPolicy};
use super::{QueryError, QueryState};
use crate::config::CacheConfig;
use crate::fetch::StatsSource;
use crate::models::{
    ApexTier, ApiHealth, Division, HighTierLeague, LeagueEntriesPage, LeagueEntry,
    PlayerSearchResult, Queue, RatedLadder, Summoner, Tier,
};
use crate::notify::NotificationBus;

/// Player ids at or below this length are treated as not entered yet.
pub const MIN_PUUID_LEN: usize = 21;

type SearchKey = (String, Option<String>);
type EntriesKey = (Tier, Division, u32);

/// Wait for `query` at most `budget`; report `Loading` when it runs longer.
/// The fetch keeps running and lands in the cache for the next request.
pub async fn with_budget<V>(
    budget: Duration,
    query: impl Future<Output = QueryState<V>>,
) -> QueryState<V> {
    tokio::time::timeout(budget, query)
        .await
        .unwrap_or(QueryState::Loading)
}

/// The cached, retrying data-fetch hooks.
pub struct Queries {
    source: Arc<dyn StatsSource>,
    retry: Arc<RetryPolicy>,
    bus: NotificationBus,
    health: QueryCache<(), ApiHealth>,
    summoner: QueryCache<String, Summoner>,
    search: QueryCache<SearchKey, PlayerSearchResult>,
    apex: QueryCache<ApexTier, HighTierLeague>,
    entries: QueryCache<EntriesKey, LeagueEntriesPage>,
    by_puuid: QueryCache<String, Vec<LeagueEntry>>,
    ladder: QueryCache<Queue, RatedLadder>,
}

/// Warn the user once per fetch that ended rate-limited.
fn report_rate_limit<V>(bus: &NotificationBus, result: &Result<V, QueryError>) {
    if let Err(e) = result {
        if e.is_rate_limited() {
            bus.warning("Rate limit", "Too many requests. Please wait a moment.");
        }
    }
}

fn puuid_param(puuid: &str) -> Option<String> {
    let puuid = puuid.trim();
    (puuid.len() >= MIN_PUUID_LEN).then(|| puuid.to_string())
}

impl Queries {
    pub fn new(
        source: Arc<dyn StatsSource>,
        retry: RetryPolicy,
        cache: &CacheConfig,
        bus: NotificationBus,
    ) -> Self {
        Self {
            source,
            retry: Arc::new(retry),
            bus,
            health: QueryCache::new("health", cache.health)
                .with_retention(cache.retention),
            summoner: QueryCache::new("summoner", cache.summoner)
                .with_retention(cache.retention),
            search: QueryCache::new("search", cache.player_search)
                .with_retention(cache.retention),
            apex: QueryCache::new("league", cache.apex_leagues)
                .with_retention(cache.retention),
            entries: QueryCache::new("league-entries", cache.league_entries)
                .with_retention(cache.retention),
            by_puuid: QueryCache::new("league-by-puuid", cache.league_by_puuid)
                .with_retention(cache.retention),
            ladder: QueryCache::new("rated-ladder", cache.rated_ladder)
                .with_retention(cache.retention),
        }
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    fn handles(&self) -> (Arc<dyn StatsSource>, Arc<RetryPolicy>, NotificationBus) {
        (
            Arc::clone(&self.source),
            Arc::clone(&self.retry),
            self.bus.clone(),
        )
    }

    /// Liveness of the league API, drives the online indicator.
    pub async fn health(&self) -> QueryState<ApiHealth> {
        let (source, retry, bus) = self.handles();
        self.health
            .get((), move || async move {
                let result = run_with_retry(&retry, "health", || source.health()).await;
                report_rate_limit(&bus, &result);
                result
            })
            .await
            .into()
    }

    /// Profile by player id. Inert for ids of 20 characters or fewer.
    pub async fn summoner(&self, puuid: &str) -> QueryState<Summoner> {
        let Some(puuid) = puuid_param(puuid) else {
            return QueryState::Idle;
        };
        let (source, retry, bus) = self.handles();
        let key = puuid.clone();
        self.summoner
            .get(key, move || async move {
                let result =
                    run_with_retry(&retry, "summoner", || source.summoner_by_puuid(&puuid)).await;
                match &result {
                    // The toast feed is shared, so success toasts never name the player.
                    Ok(_) => {
                        bus.success("Player found", "Profile loaded");
                    }
                    Err(e) if e.is_not_found() => {
                        bus.error("Player not found", "Check the PUUID you entered");
                    }
                    Err(_) => report_rate_limit(&bus, &result),
                }
                result
            })
            .await
            .into()
    }

    /// Resolve name and optional tag. Inert when the name is blank.
    pub async fn search_player(
        &self,
        game_name: &str,
        tag_line: Option<&str>,
    ) -> QueryState<PlayerSearchResult> {
        let game_name = game_name.trim().to_string();
        if game_name.is_empty() {
            return QueryState::Idle;
        }
        let tag_line = tag_line
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let (source, retry, bus) = self.handles();
        let key = (game_name.clone(), tag_line.clone());
        self.search
            .get(key, move || async move {
                let result = run_with_retry(&retry, "search", || {
                    source.search_player(&game_name, tag_line.as_deref())
                })
                .await;
                match &result {
                    Ok(_) => {
                        bus.success("Player found", "Ranked data loaded");
                    }
                    Err(e) if e.is_not_found() => {
                        bus.error("Player not found", "Check the name and tag you entered");
                    }
                    Err(_) => report_rate_limit(&bus, &result),
                }
                result
            })
            .await
            .into()
    }

    /// One apex leaderboard.
    pub async fn apex_league(&self, apex: ApexTier) -> QueryState<HighTierLeague> {
        let (source, retry, bus) = self.handles();
        self.apex
            .get(apex, move || async move {
                let label = format!("league/{}", apex.slug());
                let result = run_with_retry(&retry, &label, || source.apex_league(apex)).await;
                report_rate_limit(&bus, &result);
                result
            })
            .await
            .into()
    }

    /// All three apex leaderboards, requested concurrently.
    pub async fn high_tier_leagues(&self) -> HighTierLeagues {
        let (challenger, grandmaster, master) = tokio::join!(
            self.apex_league(ApexTier::Challenger),
            self.apex_league(ApexTier::Grandmaster),
            self.apex_league(ApexTier::Master),
        );
        HighTierLeagues {
            challenger,
            grandmaster,
            master,
        }
    }

    /// Like [`high_tier_leagues`](Self::high_tier_leagues) but gives up
    /// waiting after `budget`, reporting whatever has settled by then.
    pub async fn high_tier_leagues_within(&self, budget: Duration) -> HighTierLeagues {
        match tokio::time::timeout(budget, self.high_tier_leagues()).await {
            Ok(leagues) => leagues,
            Err(_) => self.peek_high_tier(),
        }
    }

    /// Cached apex state without starting any request.
    pub fn peek_high_tier(&self) -> HighTierLeagues {
        HighTierLeagues {
            challenger: self.apex.peek(&ApexTier::Challenger),
            grandmaster: self.apex.peek(&ApexTier::Grandmaster),
            master: self.apex.peek(&ApexTier::Master),
        }
    }

    /// Forget the apex leaderboards so the next request fetches them again.
    pub fn refresh_high_tier(&self) {
        for apex in ApexTier::ALL {
            self.apex.invalidate(&apex);
        }
        self.bus
            .info("Refreshing data", "Loading the latest standings...");
    }

    /// One page of a divisioned leaderboard. Page numbers start at 1.
    pub async fn league_entries(
        &self,
        tier: &Tier,
        division: Division,
        page: u32,
    ) -> QueryState<LeagueEntriesPage> {
        if !tier.is_known() || tier.is_apex() {
            return QueryState::Idle;
        }
        let page = page.max(1);
        let (source, retry, bus) = self.handles();
        let tier = tier.clone();
        let key = (tier.clone(), division, page);
        self.entries
            .get(key, move || async move {
                let result = run_with_retry(&retry, "league/entries", || {
                    source.league_entries(&tier, division, page)
                })
                .await;
                report_rate_limit(&bus, &result);
                result
            })
            .await
            .into()
    }

    /// Ranked standings of one player. Inert for short ids.
    pub async fn league_by_puuid(&self, puuid: &str) -> QueryState<Vec<LeagueEntry>> {
        let Some(puuid) = puuid_param(puuid) else {
            return QueryState::Idle;
        };
        let (source, retry, bus) = self.handles();
        let key = puuid.clone();
        self.by_puuid
            .get(key, move || async move {
                let result =
                    run_with_retry(&retry, "league/by-puuid", || source.league_by_puuid(&puuid))
                        .await;
                report_rate_limit(&bus, &result);
                result
            })
            .await
            .into()
    }

    pub async fn rated_ladder(&self, queue: Queue) -> QueryState<RatedLadder> {
        let (source, retry, bus) = self.handles();
        self.ladder
            .get(queue, move || async move {
                let result =
                    run_with_retry(&retry, "league/rated-ladder", || source.rated_ladder(queue))
                        .await;
                if let Err(e) = &result {
                    warn!("Rated ladder unavailable: {}", e);
                }
                report_rate_limit(&bus, &result);
                result
            })
            .await
            .into()
    }
}

/// State of the three apex leaderboards, which settle independently.
#[derive(Debug, Clone, PartialEq)]
pub struct HighTierLeagues {
    pub challenger: QueryState<HighTierLeague>,
    pub grandmaster: QueryState<HighTierLeague>,
    pub master: QueryState<HighTierLeague>,
}

/// Combined view of the three bands.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateStatus {
    /// At least one band has not settled
    Loading,
    /// Every band failed; carries the first band's error
    Failed(QueryError),
    /// At least one band loaded; `failed` lists the others that did not
    Ready { failed: Vec<ApexTier> },
}

impl HighTierLeagues {
    pub fn band(&self, apex: ApexTier) -> &QueryState<HighTierLeague> {
        match apex {
            ApexTier::Challenger => &self.challenger,
            ApexTier::Grandmaster => &self.grandmaster,
            ApexTier::Master => &self.master,
        }
    }

    /// Successfully loaded leagues, highest band first.
    pub fn loaded(&self) -> Vec<&HighTierLeague> {
        ApexTier::ALL
            .into_iter()
            .filter_map(|apex| self.band(apex).data())
            .collect()
    }

    pub fn status(&self) -> AggregateStatus {
        let states = ApexTier::ALL.map(|apex| (apex, self.band(apex)));

        if states
            .iter()
            .any(|(_, s)| matches!(s, QueryState::Loading | QueryState::Idle))
        {
            return AggregateStatus::Loading;
        }

        let failed: Vec<ApexTier> = states
            .iter()
            .filter(|(_, s)| s.error().is_some())
            .map(|(apex, _)| *apex)
            .collect();

        if failed.len() == states.len() {
            let first = states
                .iter()
                .find_map(|(_, s)| s.error().cloned())
                .unwrap_or_else(|| QueryError::aborted("league"));
            return AggregateStatus::Failed(first);
        }

        AggregateStatus::Ready { failed }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-process [`StatsSource`] with scripted failures.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use crate::fetch::{FetchError, StatsSource};
    use crate::models::fixtures::entry;
    use crate::models::*;

    #[derive(Default)]
    pub struct FakeSource {
        calls: Mutex<HashMap<String, usize>>,
        failures: Mutex<HashMap<String, u16>>,
        pub delay: Duration,
        total: AtomicUsize,
    }

    impl FakeSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }

        /// Make `endpoint` answer with `status` from now on.
        pub fn fail(&self, endpoint: &str, status: u16) {
            self.failures
                .lock()
                .unwrap()
                .insert(endpoint.to_string(), status);
        }

        pub fn recover(&self, endpoint: &str) {
            self.failures.lock().unwrap().remove(endpoint);
        }

        pub fn calls(&self, endpoint: &str) -> usize {
            self.calls.lock().unwrap().get(endpoint).copied().unwrap_or(0)
        }

        pub fn total_calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }

        async fn hit(&self, endpoint: &str) -> Result<(), FetchError> {
            *self
                .calls
                .lock()
                .unwrap()
                .entry(endpoint.to_string())
                .or_default() += 1;
            self.total.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let status = self.failures.lock().unwrap().get(endpoint).copied();
            match status {
                None => Ok(()),
                Some(404) => Err(FetchError::NotFound {
                    path: endpoint.to_string(),
                }),
                Some(429) => Err(FetchError::RateLimited {
                    path: endpoint.to_string(),
                    retry_after_secs: 1,
                }),
                Some(status) => Err(FetchError::HttpStatus {
                    status,
                    message: "scripted failure".to_string(),
                }),
            }
        }
    }

    #[async_trait]
    impl StatsSource for FakeSource {
        async fn health(&self) -> Result<ApiHealth, FetchError> {
            self.hit("healthz").await?;
            Ok(ApiHealth {
                checked_at: Utc::now(),
            })
        }

        async fn summoner_by_puuid(&self, puuid: &str) -> Result<Summoner, FetchError> {
            self.hit("summoner").await?;
            Ok(Summoner {
                puuid: puuid.to_string(),
                id: None,
                account_id: None,
                name: Some("TestPlayer".to_string()),
                profile_icon_id: 1,
                summoner_level: 120,
                revision_date: None,
            })
        }

        async fn search_player(
            &self,
            game_name: &str,
            tag_line: Option<&str>,
        ) -> Result<PlayerSearchResult, FetchError> {
            self.hit("search/player").await?;
            let mut league = entry(game_name, Tier::Diamond, Some(Division::II), 45);
            league.wins = 50;
            league.losses = 10;
            Ok(PlayerSearchResult {
                puuid: format!("puuid-{}", game_name),
                game_name: game_name.to_string(),
                tag_line: tag_line.unwrap_or("BR1").to_string(),
                summoner: None,
                league: Some(league),
            })
        }

        async fn apex_league(&self, apex: ApexTier) -> Result<HighTierLeague, FetchError> {
            self.hit(&format!("league/{}", apex.slug())).await?;
            Ok(HighTierLeague {
                apex,
                league_id: None,
                name: None,
                queue: None,
                entries: vec![
                    entry(&format!("{}-one", apex.slug()), apex.tier(), None, 900),
                    entry(&format!("{}-two", apex.slug()), apex.tier(), None, 400),
                ],
            })
        }

        async fn league_entries(
            &self,
            tier: &Tier,
            division: Division,
            page: u32,
        ) -> Result<LeagueEntriesPage, FetchError> {
            self.hit("league/entries").await?;
            Ok(LeagueEntriesPage {
                entries: vec![entry("paged", tier.clone(), Some(division), 10)],
                page,
                tier: tier.clone(),
                division,
                has_more: page < 3,
            })
        }

        async fn league_by_puuid(&self, puuid: &str) -> Result<Vec<LeagueEntry>, FetchError> {
            self.hit("league/by-puuid").await?;
            let mut standing = entry("TestPlayer", Tier::Gold, Some(Division::I), 75);
            standing.puuid = Some(puuid.to_string());
            Ok(vec![standing])
        }

        async fn rated_ladder(&self, queue: Queue) -> Result<RatedLadder, FetchError> {
            self.hit("league/rated-ladder").await?;
            Ok(RatedLadder {
                queue,
                tier: None,
                entries: Vec::new(),
            })
        }
    }
}
