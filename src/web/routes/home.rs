use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;

use super::{link, param};
use crate::query::{with_budget, QueryError, QueryState, MIN_PUUID_LEN};
use crate::web::render::Page;
use crate::web::state::AppState;
use crate::web::view::{ErrorView, SearchResultView};
use crate::web::WebError;

/// Tag assumed when the search leaves it blank.
pub const DEFAULT_TAG: &str = "BR1";

/// Shortest name worth sending to the API.
pub const MIN_NAME_LEN: usize = 2;

#[derive(Debug, Default, Deserialize)]
pub struct HomeParams {
    /// "name" (default) or "puuid"
    pub mode: Option<String>,
    pub name: Option<String>,
    pub tag: Option<String>,
    pub puuid: Option<String>,
}

/// How a lookup on the home page ended.
enum Outcome {
    /// Nothing submitted
    Empty,
    /// Rejected before any request was made
    Invalid(String),
    Loading,
    Found(SearchResultView),
    Failed(ErrorView),
}

pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<HomeParams>,
) -> Result<Html<String>, WebError> {
    let by_puuid = params.mode.as_deref() == Some("puuid");
    let name = param(&params.name);
    let tag = param(&params.tag).unwrap_or(DEFAULT_TAG);
    let puuid = param(&params.puuid);

    let budget = state.config.server.render_budget;
    let (health, outcome) = tokio::join!(with_budget(budget, state.queries.health()), async {
        if by_puuid {
            lookup_puuid(&state, puuid).await
        } else {
            search_name(&state, name, tag).await
        }
    });

    let api_status = match health {
        QueryState::Success(_) => "online",
        QueryState::Error(_) => "offline",
        QueryState::Idle | QueryState::Loading => "checking",
    };

    let back_url = if by_puuid {
        link("/", &[("mode", "puuid"), ("puuid", puuid.unwrap_or(""))])
    } else {
        link("/", &[("name", name.unwrap_or("")), ("tag", tag)])
    };

    let mut page = Page::new("home.html", "TFT Stats", "home")
        .with("back_url", &back_url)
        .with("api_status", api_status)
        .with("mode", if by_puuid { "puuid" } else { "name" })
        .with("name", name.unwrap_or(""))
        .with("tag", tag)
        .with("puuid", puuid.unwrap_or(""))
        .with("min_name_len", &MIN_NAME_LEN)
        .with("min_puuid_len", &MIN_PUUID_LEN);

    match outcome {
        Outcome::Empty => {}
        Outcome::Invalid(message) => page.insert("validation", &message),
        Outcome::Loading => page = state.loading(page),
        Outcome::Found(result) => page.insert("result", &result),
        Outcome::Failed(error) => page.insert("error", &error),
    }

    state.render(page)
}

async fn search_name(state: &AppState, name: Option<&str>, tag: &str) -> Outcome {
    let Some(name) = name else {
        return Outcome::Empty;
    };
    if name.chars().count() < MIN_NAME_LEN {
        return Outcome::Invalid(format!(
            "Enter at least {} characters to search",
            MIN_NAME_LEN
        ));
    }

    let budget = state.config.server.render_budget;
    match with_budget(budget, state.queries.search_player(name, Some(tag))).await {
        QueryState::Idle => Outcome::Empty,
        QueryState::Loading => Outcome::Loading,
        QueryState::Success(found) => Outcome::Found(SearchResultView::from(&found)),
        QueryState::Error(e) => Outcome::Failed(failure(
            &e,
            &format!("Player \"{}#{}\"", name, tag),
            link("/", &[("name", name), ("tag", tag)]),
        )),
    }
}

async fn lookup_puuid(state: &AppState, puuid: Option<&str>) -> Outcome {
    let Some(puuid) = puuid else {
        return Outcome::Empty;
    };
    if puuid.len() < MIN_PUUID_LEN {
        return Outcome::Invalid(format!(
            "A PUUID has at least {} characters",
            MIN_PUUID_LEN
        ));
    }

    let budget = state.config.server.render_budget;
    let (summoner, standings) = tokio::join!(
        with_budget(budget, state.queries.summoner(puuid)),
        with_budget(budget, state.queries.league_by_puuid(puuid)),
    );

    match (summoner, standings) {
        (QueryState::Error(e), _) => Outcome::Failed(failure(
            &e,
            "Player",
            link("/", &[("mode", "puuid"), ("puuid", puuid)]),
        )),
        (QueryState::Loading, _) | (_, QueryState::Loading) => Outcome::Loading,
        (QueryState::Success(summoner), standings) => {
            // A failed standings lookup still shows the profile, unranked.
            let standings = standings.data().cloned().unwrap_or_default();
            Outcome::Found(SearchResultView::from_profile(&summoner, &standings))
        }
        (QueryState::Idle, _) => Outcome::Empty,
    }
}

/// Not-found retries start over from an empty form; anything else retries
/// the same lookup.
fn failure(error: &QueryError, what: &str, retry: String) -> ErrorView {
    let view = ErrorView::from_query(error, what);
    if error.is_not_found() {
        view.retry("/")
    } else {
        view.retry(retry)
    }
}
