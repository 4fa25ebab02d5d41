//! Core data models for the stats dashboard.
//!
//! These are the validated shapes; the loosely-typed wire formats live in
//! [`crate::fetch::schema`].

mod ladder;
mod league;
mod player;
mod tier;

pub use ladder::*;
pub use league::*;
pub use player::*;
pub use tier::*;

#[cfg(test)]
pub(crate) use league::fixtures;
