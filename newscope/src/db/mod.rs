//! Persistence layer: all SQL lives under this module. Callers work with the plain
//! domain types from `crate::models`; the `*Row` structs here are sqlx-mapping details.

pub mod admin;
pub mod archive;
pub mod blocks;
pub mod caches;
pub mod bookmarks;
pub mod comments;
pub mod custom_feeds;
pub mod enrichment_jobs;
pub mod filters;
pub mod interactions;
pub mod invites;
pub mod news;
pub mod reactions;
pub mod ratings;
pub mod reports;
pub mod schema;
pub mod sources;
pub mod stats;
pub mod subscriptions;
pub mod users;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

pub(crate) fn parse_dt(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse timestamp: {}", s))
}

pub(crate) fn parse_dt_opt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
    s.map(|s| parse_dt(&s)).transpose()
}

pub(crate) fn now_str() -> String {
    Utc::now().to_rfc3339()
}
