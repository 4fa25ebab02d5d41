use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;

use super::{link, param};
use crate::calculate::{sort_ladder, LadderStats};
use crate::models::Queue;
use crate::query::{with_budget, QueryState};
use crate::web::render::Page;
use crate::web::state::AppState;
use crate::web::view::{or_dash, ErrorView, LadderRow, StatsCardView};
use crate::web::WebError;

#[derive(Debug, Default, Deserialize)]
pub struct RankedParams {
    pub queue: Option<String>,
}

fn ladder_cards(stats: &LadderStats) -> Vec<StatsCardView> {
    vec![
        StatsCardView::new("total", "Ranked players", stats.total_players, "👥", "blue"),
        StatsCardView::new(
            "average-rating",
            "Average rating",
            or_dash(stats.average_rating),
            "📊",
            "green",
        ),
        StatsCardView::new("top-rating", "Top rating", or_dash(stats.max_rating), "🏆", "yellow"),
        StatsCardView::new(
            "average-wins",
            "Average wins",
            or_dash(stats.average_wins),
            "⚔️",
            "purple",
        ),
    ]
}

/// Rated ladder, highest rating first.
pub async fn ranked(
    State(state): State<AppState>,
    Query(params): Query<RankedParams>,
) -> Result<Html<String>, WebError> {
    let queue = match param(&params.queue) {
        Some(q) => q.parse::<Queue>().map_err(WebError::BadRequest)?,
        None => Queue::default(),
    };

    let self_url = link("/ranked", &[("queue", queue.as_str())]);
    let mut page = Page::new("ranked.html", "Ranked Ladder", "ranked")
        .with("queue", queue.as_str())
        .with("back_url", &self_url);

    let budget = state.config.server.render_budget;
    match with_budget(budget, state.queries.rated_ladder(queue)).await {
        QueryState::Idle => {}
        QueryState::Loading => page = state.loading(page),
        QueryState::Error(e) => {
            page.insert(
                "error",
                &ErrorView::from_query(&e, "the ranked ladder").retry(self_url),
            );
        }
        QueryState::Success(ladder) => {
            let mut entries = ladder.entries;
            sort_ladder(&mut entries);
            let rows: Vec<LadderRow> = entries
                .iter()
                .enumerate()
                .map(|(i, e)| LadderRow::new(i, e))
                .collect();
            page.insert("cards", &ladder_cards(&LadderStats::compute(&entries)));
            page.insert("rated_tier", &ladder.tier);
            page.insert("rows", &rows);
        }
    }

    state.render(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ladder_cards_for_empty_ladder() {
        let cards = ladder_cards(&LadderStats::compute(&[]));
        assert_eq!(cards[0].value, "0");
        assert!(cards[1..].iter().all(|c| c.value == "—"));
    }
}
