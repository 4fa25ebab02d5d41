//! In-process league API double plus helpers for driving the dashboard.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use tft_stats::config::AppConfig;
use tft_stats::query::RetryPolicy;
use tft_stats::web::App;

/// A player id long enough to pass the client-side length check.
pub const KNOWN_PUUID: &str = "puuid-faker-0123456789abcdefghij";

#[derive(Default)]
struct Script {
    calls: HashMap<String, usize>,
    failures: HashMap<String, u16>,
    delay: Option<Duration>,
}

/// Counts requests per endpoint and answers with canned data, or with the
/// status scripted through [`MockApi::fail`].
#[derive(Clone, Default)]
pub struct MockApi {
    script: Arc<Mutex<Script>>,
}

impl MockApi {
    pub fn fail(&self, endpoint: &str, status: u16) {
        self.script
            .lock()
            .unwrap()
            .failures
            .insert(endpoint.to_string(), status);
    }

    pub fn recover(&self, endpoint: &str) {
        self.script.lock().unwrap().failures.remove(endpoint);
    }

    pub fn delay(&self, delay: Duration) {
        self.script.lock().unwrap().delay = Some(delay);
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.script
            .lock()
            .unwrap()
            .calls
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    async fn hit(&self, endpoint: &str) -> Option<Response> {
        let (failure, delay) = {
            let mut script = self.script.lock().unwrap();
            *script.calls.entry(endpoint.to_string()).or_default() += 1;
            (script.failures.get(endpoint).copied(), script.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        failure.map(|status| {
            let status = StatusCode::from_u16(status).unwrap();
            let mut response = (status, Json(json!({ "detail": "scripted" }))).into_response();
            if status == StatusCode::TOO_MANY_REQUESTS {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, "1".parse().unwrap());
            }
            response
        })
    }

    /// Serve the double on an ephemeral port.
    pub async fn spawn(&self) -> SocketAddr {
        let router = Router::new()
            .route("/healthz", get(healthz))
            .route("/summoner", get(summoner))
            .route("/search/player", get(search_player))
            .route("/league/challenger", get(challenger))
            .route("/league/grandmaster", get(grandmaster))
            .route("/league/master", get(master))
            .route("/league/entries", get(entries))
            .route("/league/by-puuid", get(by_puuid))
            .route("/league/rated-ladder", get(rated_ladder))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }
}

fn standing(name: &str, puuid: &str, lp: i32, wins: i64, losses: i64) -> Value {
    json!({
        "summonerName": name,
        "puuid": puuid,
        "queueType": "RANKED_TFT",
        "leaguePoints": lp,
        "wins": wins,
        "losses": losses,
    })
}

async fn healthz(State(api): State<MockApi>) -> Response {
    if let Some(failure) = api.hit("healthz").await {
        return failure;
    }
    Json(json!({ "status": "ok" })).into_response()
}

async fn summoner(
    State(api): State<MockApi>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if let Some(failure) = api.hit("summoner").await {
        return failure;
    }
    if q.get("puuid").map(String::as_str) != Some(KNOWN_PUUID) {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({
        "puuid": KNOWN_PUUID,
        "name": "Faker",
        "profileIconId": 29,
        "summonerLevel": 412,
    }))
    .into_response()
}

async fn search_player(
    State(api): State<MockApi>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if let Some(failure) = api.hit("search").await {
        return failure;
    }
    if !q
        .get("gameName")
        .is_some_and(|n| n.eq_ignore_ascii_case("faker"))
    {
        return StatusCode::NOT_FOUND.into_response();
    }
    let mut league = standing("Faker", KNOWN_PUUID, 1234, 50, 10);
    league["tier"] = json!("CHALLENGER");
    league["rank"] = json!("I");
    Json(json!({
        "data": {
            "puuid": KNOWN_PUUID,
            "gameName": "Faker",
            "tagLine": q.get("tagLine").cloned().unwrap_or_default(),
            "summoner": { "summonerLevel": 412, "profileIconId": 29 },
            "league": league,
        }
    }))
    .into_response()
}

async fn challenger(State(api): State<MockApi>) -> Response {
    if let Some(failure) = api.hit("challenger").await {
        return failure;
    }
    Json(json!({
        "tier": "CHALLENGER",
        "entries": [
            standing("Zed Main", "puuid-zed-main-0123456789abc", 900, 40, 40),
            standing("Faker", KNOWN_PUUID, 1234, 50, 10),
        ],
    }))
    .into_response()
}

async fn grandmaster(State(api): State<MockApi>) -> Response {
    if let Some(failure) = api.hit("grandmaster").await {
        return failure;
    }
    Json(json!({
        "tier": "GRANDMASTER",
        "entries": [standing("Grinder", "puuid-grinder-0123456789ab", 600, 70, 65)],
    }))
    .into_response()
}

async fn master(State(api): State<MockApi>) -> Response {
    if let Some(failure) = api.hit("master").await {
        return failure;
    }
    Json(json!({
        "tier": "MASTER",
        "entries": [standing("Climber", "puuid-climber-0123456789ab", 150, 20, 22)],
    }))
    .into_response()
}

async fn entries(
    State(api): State<MockApi>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if let Some(failure) = api.hit("entries").await {
        return failure;
    }
    let page: u32 = q.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let tier = q.get("tier").cloned().unwrap_or_default();
    let division = q.get("division").cloned().unwrap_or_default();
    let name = format!("Page{}Player", page);
    let mut entry = standing(&name, "puuid-page-player-0123456789", 55, 12, 8);
    entry["tier"] = json!(tier);
    entry["rank"] = json!(division);
    Json(json!({
        "entries": [entry],
        "page": page,
        "tier": tier,
        "division": division,
        "hasMore": page < 2,
    }))
    .into_response()
}

async fn by_puuid(
    State(api): State<MockApi>,
    Query(q): Query<HashMap<String, String>>,
) -> Response {
    if let Some(failure) = api.hit("by-puuid").await {
        return failure;
    }
    if q.get("puuid").map(String::as_str) != Some(KNOWN_PUUID) {
        return Json(json!([])).into_response();
    }
    let mut entry = standing("Faker", KNOWN_PUUID, 1234, 50, 10);
    entry["tier"] = json!("CHALLENGER");
    entry["rank"] = json!("I");
    Json(json!([entry])).into_response()
}

async fn rated_ladder(State(api): State<MockApi>) -> Response {
    if let Some(failure) = api.hit("rated-ladder").await {
        return failure;
    }
    Json(json!({
        "queue": "RANKED_TFT",
        "tier": "ORANGE",
        "entries": [
            { "summonerName": "Second", "ratedTier": "ORANGE", "ratedRating": 4100, "leaguePoints": 0, "wins": 90 },
            { "summonerName": "First", "ratedTier": "ORANGE", "ratedRating": 5200, "leaguePoints": 0, "wins": 120 },
        ],
    }))
    .into_response()
}

/// Configuration pointing at `addr` with millisecond retry backoff.
pub fn config_for(addr: SocketAddr) -> AppConfig {
    let mut config = AppConfig::default();
    config.api.base_url = format!("http://{}", addr);
    config.api.timeout = Duration::from_secs(5);
    config.retry = RetryPolicy {
        backoff_base: Duration::from_millis(1),
        backoff_max: Duration::from_millis(5),
        ..RetryPolicy::default()
    };
    config.server.render_budget = Duration::from_secs(5);
    config
}

/// A mock upstream and a dashboard wired to it.
pub async fn setup() -> (MockApi, App) {
    setup_with(|_| {}).await
}

pub async fn setup_with(tweak: impl FnOnce(&mut AppConfig)) -> (MockApi, App) {
    let api = MockApi::default();
    let addr = api.spawn().await;
    let mut config = config_for(addr);
    tweak(&mut config);
    let app = App::start(config).expect("app starts");
    (api, app)
}

pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub async fn send(app: &App, request: Request<Body>) -> Page {
    let response = app.router().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    Page {
        status,
        location,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get_page(app: &App, uri: &str) -> Page {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_form(app: &App, uri: &str, form: &str) -> Page {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
    )
    .await
}

/// Let the toast feed drain the notification bus.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
