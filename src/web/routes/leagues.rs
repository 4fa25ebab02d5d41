use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use axum::Form;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{link, param};
use crate::calculate::{filter_by_name, sort_by_rank, TopTierStats};
use crate::models::{ApexTier, HighTierLeague, LeagueEntry};
use crate::query::AggregateStatus;
use crate::web::render::Page;
use crate::web::state::AppState;
use crate::web::view::{or_dash, ranking_rows, ErrorView, StatsCardView};
use crate::web::WebError;

#[derive(Debug, Default, Deserialize)]
pub struct LeaguesParams {
    /// "all" or an apex band slug
    pub tier: Option<String>,
    /// Name filter
    pub q: Option<String>,
}

/// Which apex bands the table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierFilter {
    All,
    Band(ApexTier),
}

impl TierFilter {
    /// Unrecognised values fall back to every band.
    pub fn parse(value: Option<&str>) -> Self {
        value
            .and_then(ApexTier::from_slug)
            .map_or(TierFilter::All, TierFilter::Band)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            TierFilter::All => "all",
            TierFilter::Band(apex) => apex.slug(),
        }
    }

    pub fn includes(&self, apex: ApexTier) -> bool {
        match self {
            TierFilter::All => true,
            TierFilter::Band(band) => *band == apex,
        }
    }
}

#[derive(Debug, Serialize)]
struct FilterButton {
    slug: &'static str,
    label: &'static str,
    active: bool,
    url: String,
}

fn filter_buttons(active: TierFilter, term: &str) -> Vec<FilterButton> {
    std::iter::once(TierFilter::All)
        .chain(ApexTier::ALL.into_iter().map(TierFilter::Band))
        .map(|filter| FilterButton {
            slug: filter.slug(),
            label: match filter {
                TierFilter::All => "All",
                TierFilter::Band(apex) => apex.label(),
            },
            active: filter == active,
            url: link("/leagues", &[("tier", filter.slug()), ("q", term)]),
        })
        .collect()
}

/// Rows of the leaderboard table: the best `top_per_band` of every selected
/// band, narrowed by `term`, in rank order.
pub fn leaderboard<'a>(
    leagues: &[&'a HighTierLeague],
    filter: TierFilter,
    term: &str,
    top_per_band: usize,
) -> Vec<&'a LeagueEntry> {
    let mut pool: Vec<&LeagueEntry> = Vec::new();
    for league in leagues.iter().filter(|l| filter.includes(l.apex)) {
        let mut band: Vec<&LeagueEntry> = league.entries.iter().collect();
        sort_by_rank(&mut band);
        band.truncate(top_per_band);
        pool.extend(band);
    }
    let mut rows = filter_by_name(pool, term);
    sort_by_rank(&mut rows);
    rows
}

fn results_summary(shown: usize, filter: TierFilter, term: &str) -> String {
    let scope = match filter {
        TierFilter::All => "players across all apex tiers".to_string(),
        TierFilter::Band(apex) => format!("{} players", apex.label()),
    };
    let mut summary = format!("Showing TOP {} {}", shown, scope);
    if !term.is_empty() {
        summary.push_str(&format!(" matching \"{}\"", term));
    }
    summary
}

fn stats_cards(stats: &TopTierStats, top_per_band: usize) -> Vec<StatsCardView> {
    let mut cards = vec![StatsCardView::new(
        "total",
        "Players shown",
        stats.total_shown,
        "👥",
        "blue",
    )
    .subtitle(format!("TOP {} of each apex tier", top_per_band))];

    for (apex, icon, color, subtitle) in [
        (ApexTier::Challenger, "👑", "yellow", "The absolute elite"),
        (ApexTier::Grandmaster, "🔴", "red", "Fierce competition"),
        (ApexTier::Master, "🟣", "purple", "Dedicated players"),
    ] {
        let shown = stats
            .bands
            .iter()
            .find(|b| b.apex == apex)
            .map(|b| format!("{}/{}", b.shown, top_per_band));
        cards.push(
            StatsCardView::new(
                apex.slug(),
                format!("{} TOP {}", apex.label(), top_per_band),
                or_dash(shown),
                icon,
                color,
            )
            .subtitle(subtitle),
        );
    }

    cards.push(
        StatsCardView::new(
            "average-lp",
            format!("Average LP TOP {}", top_per_band),
            or_dash(stats.average_lp),
            "📊",
            "green",
        )
        .subtitle(format!("Highest: {}", or_dash(stats.top_lp))),
    );
    cards
}

pub async fn leagues(
    State(state): State<AppState>,
    Query(params): Query<LeaguesParams>,
) -> Result<Html<String>, WebError> {
    let filter = TierFilter::parse(param(&params.tier));
    let term = param(&params.q).unwrap_or("");
    let top = state.config.leaderboard.top_per_band;

    let mut page = Page::new("leagues.html", "High Tier Leagues", "leagues")
        .with("heading", &format!("TOP {} High Tier Leagues", top))
        .with("tier", filter.slug())
        .with("q", term)
        .with("filters", &filter_buttons(filter, term))
        .with("back_url", &link("/leagues", &[("tier", filter.slug()), ("q", term)]));

    let leagues = state
        .queries
        .high_tier_leagues_within(state.config.server.render_budget)
        .await;

    match leagues.status() {
        AggregateStatus::Loading => {
            debug!("apex leagues still loading, rendering placeholder");
            page = state.loading(page);
        }
        AggregateStatus::Failed(e) => {
            page.insert("error", &ErrorView::from_query(&e, "the rankings"));
        }
        AggregateStatus::Ready { failed } => {
            let loaded = leagues.loaded();
            let stats = TopTierStats::compute(&loaded, top);
            let rows = leaderboard(&loaded, filter, term, top);

            if !failed.is_empty() {
                let names: Vec<&str> = failed.iter().map(|a| a.label()).collect();
                page.insert(
                    "partial",
                    &format!("Could not load {}. Showing the tiers that did load.", names.join(", ")),
                );
            }
            page.insert("cards", &stats_cards(&stats, top));
            page.insert("summary", &results_summary(rows.len(), filter, term));
            page.insert("rows", &ranking_rows(rows));
        }
    }

    state.render(page)
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshForm {
    pub tier: Option<String>,
    pub q: Option<String>,
}

/// Drop the cached leaderboards and go back to the same view.
pub async fn refresh(State(state): State<AppState>, Form(form): Form<RefreshForm>) -> Redirect {
    state.queries.refresh_high_tier();
    let filter = TierFilter::parse(param(&form.tier));
    let term = param(&form.q).unwrap_or("");
    Redirect::to(&link("/leagues", &[("tier", filter.slug()), ("q", term)]))
}
