use axum::extract::{Path, State};
use axum::response::Html;

use crate::calculate::sort_by_rank;
use crate::query::{with_budget, QueryState, MIN_PUUID_LEN};
use crate::web::render::Page;
use crate::web::state::AppState;
use crate::web::view::{player_url, ranking_rows, ErrorView};
use crate::web::WebError;

/// Profile and ranked standings of one player.
pub async fn player(
    State(state): State<AppState>,
    Path(puuid): Path<String>,
) -> Result<Html<String>, WebError> {
    let puuid = puuid.trim();
    if puuid.len() < MIN_PUUID_LEN {
        return Err(WebError::BadRequest(format!(
            "a player id has at least {} characters",
            MIN_PUUID_LEN
        )));
    }

    let budget = state.config.server.render_budget;
    let (summoner, standings) = tokio::join!(
        with_budget(budget, state.queries.summoner(puuid)),
        with_budget(budget, state.queries.league_by_puuid(puuid)),
    );

    let self_url = player_url(puuid);
    let mut page = Page::new("player.html", "Player", "home")
        .with("puuid", puuid)
        .with("back_url", &self_url);

    if summoner.is_loading() || standings.is_loading() {
        return state.render(state.loading(page));
    }

    match &summoner {
        QueryState::Success(s) => {
            page.insert("title", &format!("{} · Player", s.display_name()));
            page.insert("summoner", s);
            page.insert("name", s.display_name());
        }
        QueryState::Error(e) => {
            page.insert(
                "error",
                &ErrorView::from_query(e, "Player").retry(self_url.clone()),
            );
        }
        QueryState::Idle | QueryState::Loading => {}
    }

    match standings {
        QueryState::Success(mut entries) => {
            sort_by_rank(&mut entries);
            page.insert("standings", &ranking_rows(&entries));
        }
        QueryState::Error(e) if summoner.data().is_some() => {
            page.insert(
                "standings_error",
                &ErrorView::from_query(&e, "ranked standings"),
            );
        }
        _ => {}
    }

    state.render(page)
}
