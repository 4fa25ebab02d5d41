//! Server-rendered dashboard.
//!
//! Axum routes that pull data through [`crate::query::Queries`] and render
//! Tera templates.

pub mod render;
pub mod routes;
pub mod state;
pub mod style;
pub mod view;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tera::{Context, Tera};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::error;

pub use state::{App, AppState, StartupError};

/// Page-level failures. Data errors are rendered inside the page instead.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tera::Error> for WebError {
    fn from(e: tera::Error) -> Self {
        // Tera keeps the useful part in the source chain.
        let mut message = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            message = format!("{}: {}", message, cause);
            source = cause.source();
        }
        WebError::Internal(message)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, title) = match &self {
            WebError::NotFound(_) => (StatusCode::NOT_FOUND, "Page not found"),
            WebError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
            WebError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong"),
        };
        if let WebError::Internal(message) = &self {
            error!("Render failed: {}", message);
        }

        let mut ctx = Context::new();
        ctx.insert("status", &status.as_u16());
        ctx.insert("title", title);
        ctx.insert("message", &self.to_string());

        match Tera::one_off(render::ERROR_TEMPLATE, &ctx, true) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(_) => (status, self.to_string()).into_response(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home::home))
        .route("/player/:puuid", get(routes::player::player))
        .route("/leagues", get(routes::leagues::leagues))
        .route("/leagues/refresh", post(routes::leagues::refresh))
        .route("/ranked", get(routes::ranked::ranked))
        .route("/search", get(routes::search::search))
        .route("/analytics", get(routes::analytics::analytics))
        .route("/toasts/:id/dismiss", post(routes::toasts::dismiss))
        .route("/healthz", get(|| async { "ok" }))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> WebError {
    WebError::NotFound("no page at this address".to_string())
}
