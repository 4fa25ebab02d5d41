use axum::extract::{Query, State};
use axum::response::Html;
use serde::{Deserialize, Serialize};

use super::{link, param};
use crate::calculate::sort_by_rank;
use crate::models::{Division, Tier};
use crate::query::{with_budget, QueryState};
use crate::web::render::Page;
use crate::web::state::AppState;
use crate::web::view::{ranking_rows, ErrorView, RankingRow};
use crate::web::WebError;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub tier: Option<String>,
    pub division: Option<String>,
    pub page: Option<String>,
}

/// Validated leaderboard selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub tier: Tier,
    pub division: Division,
    pub page: u32,
}

impl Selection {
    /// Gold I, first page, for anything left out. Apex and unknown tiers are
    /// rejected: only divisioned bands are paginated.
    pub fn parse(params: &SearchParams) -> Result<Self, WebError> {
        let tier = param(&params.tier).map_or(Tier::Gold, Tier::from_name);
        if !tier.is_known() {
            return Err(WebError::BadRequest(format!("unknown tier: {}", tier)));
        }
        if tier.is_apex() {
            return Err(WebError::BadRequest(format!(
                "{} has no divisions; see the leagues page",
                tier
            )));
        }

        let division = match param(&params.division) {
            Some(d) => d.parse::<Division>().map_err(WebError::BadRequest)?,
            None => Division::I,
        };

        let page = match param(&params.page) {
            Some(p) => p
                .parse::<u32>()
                .map_err(|_| WebError::BadRequest(format!("invalid page: {}", p)))?,
            None => 1,
        };

        Ok(Self {
            tier,
            division,
            page: page.max(1),
        })
    }

    fn url(&self, page: u32) -> String {
        link(
            "/search",
            &[
                ("tier", self.tier.as_str()),
                ("division", self.division.as_str()),
                ("page", &page.to_string()),
            ],
        )
    }
}

#[derive(Debug, Serialize)]
struct Choice {
    value: String,
    selected: bool,
}

/// One page of a divisioned leaderboard.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, WebError> {
    let selection = Selection::parse(&params)?;

    let tiers: Vec<Choice> = Tier::DIVISIONED
        .iter()
        .rev()
        .map(|t| Choice {
            value: t.as_str().to_string(),
            selected: *t == selection.tier,
        })
        .collect();
    let divisions: Vec<Choice> = Division::ALL
        .iter()
        .rev()
        .map(|d| Choice {
            value: d.as_str().to_string(),
            selected: *d == selection.division,
        })
        .collect();

    let mut page = Page::new("search.html", "League Search", "search")
        .with("tier", selection.tier.as_str())
        .with("division", selection.division.as_str())
        .with("page", &selection.page)
        .with("tiers", &tiers)
        .with("divisions", &divisions)
        .with("back_url", &selection.url(selection.page));

    let budget = state.config.server.render_budget;
    let result = with_budget(
        budget,
        state
            .queries
            .league_entries(&selection.tier, selection.division, selection.page),
    )
    .await;

    match result {
        QueryState::Idle => page.insert("rows", &Vec::<RankingRow>::new()),
        QueryState::Loading => page = state.loading(page),
        QueryState::Error(e) => {
            let what = format!("{} {}", selection.tier, selection.division);
            page.insert(
                "error",
                &ErrorView::from_query(&e, &what).retry(selection.url(selection.page)),
            );
        }
        QueryState::Success(mut result) => {
            sort_by_rank(&mut result.entries);
            if selection.page > 1 {
                page.insert("prev_url", &selection.url(selection.page - 1));
            }
            if result.has_more {
                page.insert("next_url", &selection.url(selection.page + 1));
            }
            page.insert("rows", &ranking_rows(&result.entries));
        }
    }

    state.render(page)
}
