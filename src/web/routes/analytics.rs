use axum::extract::State;
use axum::response::Html;
use serde::Serialize;

use crate::calculate::{share, HighTierAnalytics, LadderStats};
use crate::models::Queue;
use crate::query::{with_budget, AggregateStatus, QueryState};
use crate::web::render::Page;
use crate::web::state::AppState;
use crate::web::view::{or_dash, percent, ErrorView, StatsCardView};
use crate::web::WebError;

fn overview_cards(a: &HighTierAnalytics) -> Vec<StatsCardView> {
    vec![
        StatsCardView::new("total", "Total high tier", a.total_players, "👥", "blue")
            .subtitle("Master, Grandmaster, Challenger"),
        StatsCardView::new("average-lp", "Average LP", or_dash(a.average_lp), "📊", "green")
            .subtitle(format!(
                "Range: {} - {}",
                or_dash(a.min_lp),
                or_dash(a.max_lp)
            )),
        StatsCardView::new(
            "average-wr",
            "Average WR",
            a.average_win_rate
                .map_or_else(|| "—".to_string(), |wr| format!("{}%", wr)),
            "🎯",
            "yellow",
        )
        .subtitle(format!("Best: {}", percent(a.max_win_rate))),
        StatsCardView::new(
            "activity",
            "Activity rate",
            a.activity_rate
                .map_or_else(|| "—".to_string(), |r| format!("{}%", r)),
            "⚡",
            "purple",
        )
        .subtitle(format!("{} inactive", a.status.inactive)),
    ]
}

fn status_cards(a: &HighTierAnalytics) -> Vec<StatsCardView> {
    let of_players = |n: usize| format!("{} of players", percent(share(n, a.total_players)));
    vec![
        StatsCardView::new("hot-streak", "Hot streaks", a.status.hot_streak, "🔥", "red")
            .subtitle(of_players(a.status.hot_streak)),
        StatsCardView::new("veteran", "Veterans", a.status.veteran, "⭐", "purple")
            .subtitle(of_players(a.status.veteran)),
        StatsCardView::new("fresh-blood", "Fresh blood", a.status.fresh_blood, "🆕", "green")
            .subtitle(of_players(a.status.fresh_blood)),
        StatsCardView::new("inactive", "Inactive", a.status.inactive, "💤", "blue")
            .subtitle(of_players(a.status.inactive)),
    ]
}

/// A bar of a distribution chart; `width` is a percentage of the largest bar.
#[derive(Debug, Serialize)]
struct Bar {
    label: String,
    count: usize,
    share: String,
    width: u32,
}

fn bars(items: impl IntoIterator<Item = (String, usize)>, total: usize) -> Vec<Bar> {
    let items: Vec<(String, usize)> = items.into_iter().collect();
    let largest = items.iter().map(|(_, n)| *n).max().unwrap_or(0);
    items
        .into_iter()
        .map(|(label, count)| Bar {
            label,
            count,
            share: percent(share(count, total)),
            width: share(count, largest).map_or(0, |s| s.round() as u32),
        })
        .collect()
}

/// Aggregates over the apex bands and the rated ladder.
pub async fn analytics(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let budget = state.config.server.render_budget;
    let (leagues, ladder) = tokio::join!(
        state.queries.high_tier_leagues_within(budget),
        with_budget(budget, state.queries.rated_ladder(Queue::RankedTft)),
    );

    let mut page = Page::new("analytics.html", "Analytics", "analytics").with("back_url", "/analytics");

    match leagues.status() {
        AggregateStatus::Loading => return state.render(state.loading(page)),
        AggregateStatus::Failed(e) => {
            page.insert("error", &ErrorView::from_query(&e, "the analytics").retry("/analytics"));
        }
        AggregateStatus::Ready { failed } => {
            let loaded = leagues.loaded();
            let a = HighTierAnalytics::compute(&loaded);

            if !failed.is_empty() {
                let names: Vec<&str> = failed.iter().map(|t| t.label()).collect();
                page.insert(
                    "partial",
                    &format!("Could not load {}; figures cover the other tiers.", names.join(", ")),
                );
            }
            page.insert("overview", &overview_cards(&a));
            page.insert("status_cards", &status_cards(&a));
            page.insert(
                "tier_bars",
                &bars(
                    a.tier_distribution
                        .bands
                        .iter()
                        .map(|(apex, n)| (apex.label().to_string(), *n)),
                    a.tier_distribution.total(),
                ),
            );
            page.insert(
                "lp_bars",
                &bars(
                    a.lp_distribution
                        .buckets
                        .iter()
                        .map(|b| (format!("{} LP", b.label), b.count)),
                    a.lp_distribution.total(),
                ),
            );
            page.insert(
                "lp_mode",
                &a.lp_distribution.most_populated().map(|b| b.label),
            );
            page.insert("lp_spread", &or_dash(a.lp_spread));
        }
    }

    match ladder {
        QueryState::Success(ladder) => {
            let stats = LadderStats::compute(&ladder.entries);
            page.insert("ladder", &stats);
            page.insert("ladder_average_rating", &or_dash(stats.average_rating));
            page.insert("ladder_max_rating", &or_dash(stats.max_rating));
        }
        QueryState::Error(e) => {
            page.insert("ladder_error", &ErrorView::from_query(&e, "the ranked ladder"));
        }
        QueryState::Idle | QueryState::Loading => {}
    }

    state.render(page)
}
