use std::sync::Arc;

use axum::response::Html;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::render::{Page, Renderer};
use super::view::ToastView;
use super::WebError;
use crate::config::{AppConfig, ConfigError};
use crate::fetch::{ApiClient, FetchError, StatsSource};
use crate::notify::{NotificationBus, ToastFeed};
use crate::query::Queries;

#[derive(Clone)]
pub struct AppState {
    pub queries: Arc<Queries>,
    pub renderer: Arc<Renderer>,
    pub toasts: ToastFeed,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Render `page` with the navigation chrome and the visible toasts.
    pub fn render(&self, mut page: Page) -> Result<Html<String>, WebError> {
        let toasts: Vec<ToastView> = self.toasts.active().iter().map(ToastView::from).collect();
        page.insert("toasts", &toasts);
        self.renderer
            .render(page.template, &page.context)
            .map(Html)
    }

    /// Page in its loading state, reloading itself until data arrives.
    pub fn loading(&self, page: Page) -> Page {
        page.with("loading", &true)
            .reload_after(self.config.server.loading_refresh_secs)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not build API client: {0}")]
    Client(#[from] FetchError),

    #[error("Template error: {0}")]
    Templates(#[from] tera::Error),
}

/// A wired application: state, notification bus and the toast feed task.
pub struct App {
    pub state: AppState,
    bus: NotificationBus,
    feed_task: JoinHandle<()>,
}

impl App {
    /// Wire the application against the configured league API.
    pub fn start(config: AppConfig) -> Result<Self, StartupError> {
        let client = ApiClient::new(config.api.client_config()?)?;
        info!("League API: {}", client.base_url());
        Self::with_source(config, Arc::new(client))
    }

    /// Wire the application against any data source. Must run inside a
    /// Tokio runtime.
    pub fn with_source(
        config: AppConfig,
        source: Arc<dyn StatsSource>,
    ) -> Result<Self, StartupError> {
        let renderer = Renderer::new()?;
        let bus = NotificationBus::new();
        let (toasts, feed_task) = ToastFeed::spawn(&bus, &config.notifications);
        let queries = Queries::new(source, config.retry.clone(), &config.cache, bus.clone());

        Ok(Self {
            state: AppState {
                queries: Arc::new(queries),
                renderer: Arc::new(renderer),
                toasts,
                config: Arc::new(config),
            },
            bus,
            feed_task,
        })
    }

    pub fn router(&self) -> axum::Router {
        super::build_router(self.state.clone())
    }

    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    /// Close the notification bus and wait for the toast feed to drain.
    pub async fn shutdown(self) {
        self.bus.shutdown();
        if let Err(e) = self.feed_task.await {
            debug!("toast feed ended abnormally: {}", e);
        }
        info!("Application stopped");
    }
}
