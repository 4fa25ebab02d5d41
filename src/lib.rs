//! # TFT Stats
//!
//! A server-rendered dashboard for Teamfight Tactics ranked data.
//!
//! ## Architecture
//!
//! - **models**: Typed league, player and ladder records
//! - **fetch**: League API client and response schema validation
//! - **query**: Cached, retrying data-fetch layer used by the pages
//! - **calculate**: Rank ordering, win rates and aggregate statistics
//! - **notify**: Notification bus and the toast feed shown on pages
//! - **web**: Axum router, templates and page handlers
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod notify;
pub mod query;
pub mod web;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "6h", "30m", "90s", "250ms").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(n) = s.strip_suffix("ms") {
        let num: u64 = n.trim().parse().ok()?;
        return Some(Duration::from_millis(num));
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    Some(Duration::from_secs(num.checked_mul(multiplier)?))
}

/// Format a duration in the largest unit that represents it exactly.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis % 1000 != 0 {
        return format!("{}ms", millis);
    }
    let secs = d.as_secs();
    if secs > 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
