//! Page handlers, one module per route.

pub mod analytics;
pub mod home;
pub mod leagues;
pub mod player;
pub mod ranked;
pub mod search;
pub mod toasts;

use url::form_urlencoded;

/// `path` with `pairs` as its query string. Empty values are left out.
pub(crate) fn link(path: &str, pairs: &[(&str, &str)]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs.iter().filter(|(_, v)| !v.is_empty()) {
        query.append_pair(key, value);
        any = true;
    }
    if any {
        format!("{}?{}", path, query.finish())
    } else {
        path.to_string()
    }
}

/// Trimmed parameter, `None` when absent or blank.
pub(crate) fn param(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
