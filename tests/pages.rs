//! End-to-end page tests against an in-process league API.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use common::{get_page, post_form, settle, setup, setup_with, KNOWN_PUUID};

#[tokio::test]
async fn test_health_endpoint() {
    let (_api, app) = setup().await;
    let page = get_page(&app, "/healthz").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn test_unknown_route_renders_not_found_page() {
    let (_api, app) = setup().await;
    let page = get_page(&app, "/no/such/page").await;
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.body.contains("data-cy=\"error-page\""));
    assert!(page.body.contains("data-cy=\"back-home-link\""));
}

#[tokio::test]
async fn test_home_without_query_shows_empty_form() {
    let (api, app) = setup().await;
    let page = get_page(&app, "/").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data-cy=\"main-title\""));
    assert!(page.body.contains("data-cy=\"api-status-online\""));
    assert!(!page.body.contains("data-cy=\"search-result\""));
    assert_eq!(api.calls("search"), 0);
}

#[tokio::test]
async fn test_search_known_player_shows_league_card() {
    let (api, app) = setup().await;
    let page = get_page(&app, "/?name=Faker&tag=KR1").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data-cy=\"search-result\""));
    assert!(page.body.contains("Faker#KR1"));
    assert!(page
        .body
        .contains("data-cy=\"search-result-tier\">👑 CHALLENGER</p>"));
    assert!(page
        .body
        .contains("data-cy=\"search-result-lp\">1234 LP</p>"));
    assert!(page
        .body
        .contains("data-cy=\"search-result-wins\">50</p>"));
    assert!(page
        .body
        .contains("data-cy=\"search-result-losses\">10</p>"));
    assert!(page.body.contains("83%</p>"));
    assert_eq!(api.calls("search"), 1);

    // Served from cache the second time
    get_page(&app, "/?name=Faker&tag=KR1").await;
    assert_eq!(api.calls("search"), 1);
}

#[tokio::test]
async fn test_search_blank_tag_uses_default() {
    let (_api, app) = setup().await;
    let page = get_page(&app, "/?name=Faker&tag=").await;
    assert!(page.body.contains("Faker#BR1"));
}

#[tokio::test]
async fn test_search_unknown_player_is_attempted_once() {
    let (api, app) = setup().await;
    let page = get_page(&app, "/?name=Nobody&tag=BR1").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data-cy=\"search-error\""));
    assert!(page.body.contains("Nobody#BR1"));
    assert!(page.body.contains("not found."));
    assert!(page.body.contains("data-cy=\"search-error-retry\""));
    assert_eq!(api.calls("search"), 1);
}

#[tokio::test]
async fn test_short_name_is_rejected_without_request() {
    let (api, app) = setup().await;
    let page = get_page(&app, "/?name=a").await;
    assert!(page.body.contains("data-cy=\"search-validation\""));
    assert!(page.body.contains("Enter at least 2 characters"));
    assert_eq!(api.calls("search"), 0);
}

#[tokio::test]
async fn test_rate_limit_warns_once_and_is_not_retried() {
    let (api, app) = setup().await;
    api.fail("search", 429);

    let page = get_page(&app, "/?name=Faker&tag=BR1").await;
    assert!(page.body.contains("data-cy=\"search-error\""));
    assert!(page.body.contains("Too many requests"));
    assert_eq!(api.calls("search"), 1);

    settle().await;
    let toasts = app.state.toasts.active();
    assert!(toasts.iter().any(|t| t.title == "Rate limit"));

    let next = get_page(&app, "/").await;
    assert!(next.body.contains("data-cy=\"toast-warning\""));
}

#[tokio::test]
async fn test_toast_can_be_dismissed() {
    let (_api, app) = setup().await;
    get_page(&app, "/?name=Faker&tag=BR1").await;
    settle().await;

    let toast = app
        .state
        .toasts
        .active()
        .into_iter()
        .find(|t| t.title == "Player found")
        .expect("success toast");

    let resp = post_form(
        &app,
        &format!("/toasts/{}/dismiss", toast.id),
        "back=%2Fleagues",
    )
    .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.location.as_deref(), Some("/leagues"));
    assert!(app.state.toasts.active().iter().all(|t| t.id != toast.id));
}

#[tokio::test]
async fn test_health_failure_shows_offline() {
    let (api, app) = setup().await;
    api.fail("healthz", 503);
    let page = get_page(&app, "/").await;
    assert!(page.body.contains("data-cy=\"api-status-offline\""));
    assert_eq!(api.calls("healthz"), 3);
}

#[tokio::test]
async fn test_lookup_by_puuid() {
    let (api, app) = setup().await;
    let page = get_page(&app, &format!("/?mode=puuid&puuid={}", KNOWN_PUUID)).await;
    assert!(page.body.contains("data-cy=\"search-result\""));
    assert!(page.body.contains("data-cy=\"search-result-tier\""));
    assert_eq!(api.calls("summoner"), 1);
    assert_eq!(api.calls("by-puuid"), 1);

    let short = get_page(&app, "/?mode=puuid&puuid=short").await;
    assert!(short.body.contains("data-cy=\"search-validation\""));
    assert_eq!(api.calls("summoner"), 1);
}

#[tokio::test]
async fn test_player_page() {
    let (_api, app) = setup().await;
    let page = get_page(&app, &format!("/player/{}", KNOWN_PUUID)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data-cy=\"player-profile\""));
    assert!(page.body.contains("Faker"));

    let bad = get_page(&app, "/player/short").await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_player_page_unknown_player() {
    let (api, app) = setup().await;
    let page = get_page(&app, "/player/unknown%20player%200123456789abc").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data-cy=\"player-error\""));
    assert!(page.body.contains("data-cy=\"error-not-found\""));
    assert!(!page.body.contains("data-cy=\"player-profile\""));
    // The retry link keeps the id as one encoded path segment
    assert!(page.body.contains("unknown%20player%200123456789abc"));
    assert_eq!(api.calls("summoner"), 1);
}

#[tokio::test]
async fn test_player_page_standings_failure_keeps_profile() {
    let (api, app) = setup().await;
    api.fail("by-puuid", 500);

    let page = get_page(&app, &format!("/player/{}", KNOWN_PUUID)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data-cy=\"player-profile\""));
    assert!(page.body.contains("data-cy=\"standings-error\""));
    assert!(page.body.contains("Could not load ranked standings."));
    assert!(!page.body.contains("data-cy=\"player-error\""));
    assert_eq!(api.calls("by-puuid"), 3);
}

#[tokio::test]
async fn test_leagues_sorted_across_bands() {
    let (api, app) = setup().await;
    let page = get_page(&app, "/leagues").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("TOP 10 High Tier Leagues"));
    assert!(page.body.contains("data-cy=\"player-row-3\""));
    let faker = page.body.find("Faker").unwrap();
    let zed = page.body.find("Zed Main").unwrap();
    let climber = page.body.find("Climber").unwrap();
    assert!(faker < zed && zed < climber);
    assert!(page.body.contains("Showing TOP 4 players across all apex tiers"));
    for band in ["challenger", "grandmaster", "master"] {
        assert_eq!(api.calls(band), 1);
    }
}

#[tokio::test]
async fn test_leagues_filters() {
    let (_api, app) = setup().await;

    let by_name = get_page(&app, "/leagues?q=FAK").await;
    assert!(by_name.body.contains("Faker"));
    assert!(!by_name.body.contains("Zed Main"));
    assert!(by_name.body.contains("Showing TOP 1 players across all apex tiers"));

    let by_band = get_page(&app, "/leagues?tier=master").await;
    assert!(by_band.body.contains("Climber"));
    assert!(!by_band.body.contains("Grinder"));
    assert!(by_band.body.contains("Showing TOP 1 Master players"));

    let unknown = get_page(&app, "/leagues?tier=diamond").await;
    assert!(unknown.body.contains("Showing TOP 4 players across all apex tiers"));

    let nobody = get_page(&app, "/leagues?q=zzz").await;
    assert!(nobody.body.contains("data-cy=\"rankings-empty\""));
}

#[tokio::test]
async fn test_leagues_partial_failure() {
    let (api, app) = setup().await;
    api.fail("master", 500);
    let page = get_page(&app, "/leagues").await;

    assert!(page.body.contains("data-cy=\"leagues-partial\""));
    assert!(page.body.contains("Could not load Master"));
    assert!(page.body.contains("Faker"));
    assert!(!page.body.contains("Climber"));
    assert_eq!(api.calls("master"), 3);
}

#[tokio::test]
async fn test_leagues_total_failure_then_refresh() {
    let (api, app) = setup().await;
    for band in ["challenger", "grandmaster", "master"] {
        api.fail(band, 500);
    }

    let page = get_page(&app, "/leagues").await;
    assert!(page.body.contains("data-cy=\"leagues-error\""));
    assert!(page.body.contains("Error loading data"));
    assert!(page.body.contains("Could not load the rankings."));
    for band in ["challenger", "grandmaster", "master"] {
        assert_eq!(api.calls(band), 3);
        api.recover(band);
    }

    let redirect = post_form(&app, "/leagues/refresh", "tier=all&q=").await;
    assert_eq!(redirect.status, StatusCode::SEE_OTHER);
    assert_eq!(redirect.location.as_deref(), Some("/leagues?tier=all"));

    let page = get_page(&app, "/leagues?tier=all").await;
    assert!(page.body.contains("Faker"));
    assert_eq!(api.calls("challenger"), 4);
}

#[tokio::test]
async fn test_refresh_refetches_cached_leagues() {
    let (api, app) = setup().await;
    get_page(&app, "/leagues").await;
    get_page(&app, "/leagues").await;
    assert_eq!(api.calls("grandmaster"), 1);

    post_form(&app, "/leagues/refresh", "tier=grandmaster&q=grind").await;
    get_page(&app, "/leagues").await;
    assert_eq!(api.calls("grandmaster"), 2);
}

#[tokio::test]
async fn test_slow_leagues_render_loading_then_data() {
    let (api, app) = setup_with(|c| c.server.render_budget = Duration::from_millis(50)).await;
    api.delay(Duration::from_millis(300));

    let first = get_page(&app, "/leagues").await;
    assert!(first.body.contains("data-cy=\"leagues-loading\""));
    assert!(first.body.contains("Loading rankings..."));
    assert!(first.body.contains("http-equiv=\"refresh\""));

    tokio::time::sleep(Duration::from_millis(600)).await;
    let second = get_page(&app, "/leagues").await;
    assert!(second.body.contains("Faker"));
    assert_eq!(api.calls("challenger"), 1);
}

#[tokio::test]
async fn test_ranked_ladder_sorted_by_rating() {
    let (_api, app) = setup().await;
    let page = get_page(&app, "/ranked").await;

    assert_eq!(page.status, StatusCode::OK);
    let first = page.body.find("First").unwrap();
    let second = page.body.find("Second").unwrap();
    assert!(first < second);
    assert!(page.body.contains("data-cy=\"ladder-row-1\""));
    assert!(page.body.contains("5200"));

    let bad = get_page(&app, "/ranked?queue=NORMAL").await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ranked_ladder_failure_is_shown_inline() {
    let (api, app) = setup().await;
    api.fail("rated-ladder", 502);
    let page = get_page(&app, "/ranked").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data-cy=\"ranked-error\""));
}

#[tokio::test]
async fn test_league_search_pagination() {
    let (api, app) = setup().await;
    let first = get_page(&app, "/search?tier=SILVER&division=II").await;

    assert_eq!(first.status, StatusCode::OK);
    assert!(first.body.contains("Page1Player"));
    assert!(first.body.contains("data-cy=\"page-next\""));
    assert!(!first.body.contains("data-cy=\"page-prev\""));

    let second = get_page(&app, "/search?tier=SILVER&division=II&page=2").await;
    assert!(second.body.contains("Page2Player"));
    assert!(second.body.contains("data-cy=\"page-prev\""));
    assert!(!second.body.contains("data-cy=\"page-next\""));
    assert_eq!(api.calls("entries"), 2);
}

#[tokio::test]
async fn test_league_search_rejects_apex_tier() {
    let (api, app) = setup().await;
    let page = get_page(&app, "/search?tier=CHALLENGER&division=I").await;
    assert_eq!(page.status, StatusCode::BAD_REQUEST);
    assert_eq!(api.calls("entries"), 0);
}

#[tokio::test]
async fn test_analytics_page() {
    let (_api, app) = setup().await;
    let page = get_page(&app, "/analytics").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("data-cy=\"tier-distribution\""));
    assert!(page.body.contains("data-cy=\"analytics-status\""));
    assert!(page.body.contains("average rating 4650"));
}

#[tokio::test]
async fn test_analytics_without_ladder() {
    let (api, app) = setup().await;
    api.fail("rated-ladder", 404);
    let page = get_page(&app, "/analytics").await;
    assert!(page.body.contains("data-cy=\"analytics-overview\""));
    assert!(page.body.contains("data-cy=\"ladder-error\""));
}
