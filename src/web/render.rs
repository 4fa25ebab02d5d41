//! Template rendering.
//!
//! Templates are compiled into the binary and loaded once at startup.

use serde::Serialize;
use tera::{Context, Tera};

use super::WebError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("macros.html", include_str!("../../templates/macros.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("player.html", include_str!("../../templates/player.html")),
    ("leagues.html", include_str!("../../templates/leagues.html")),
    ("ranked.html", include_str!("../../templates/ranked.html")),
    ("search.html", include_str!("../../templates/search.html")),
    ("analytics.html", include_str!("../../templates/analytics.html")),
];

/// Standalone page used by [`WebError`], which has no access to app state.
pub(crate) const ERROR_TEMPLATE: &str = include_str!("../../templates/error.html");

pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, WebError> {
        self.tera.render(template, context).map_err(WebError::from)
    }
}

/// A page on its way to the renderer.
pub struct Page {
    pub template: &'static str,
    pub context: Context,
}

impl Page {
    /// `nav` names the navigation entry to highlight.
    pub fn new(template: &'static str, title: &str, nav: &str) -> Self {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("nav", nav);
        context.insert("refresh_secs", &0u32);
        context.insert("back_url", "/");
        Self { template, context }
    }

    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn insert<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.context.insert(key, value);
    }

    /// Ask the browser to reload after `secs` while data is still loading.
    pub fn reload_after(self, secs: u32) -> Self {
        self.with("refresh_secs", &secs)
    }
}
