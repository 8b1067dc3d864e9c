//! Trending and recommendation surfaces. Both read from the same approved/non-duplicate/
//! unexpired candidate pool the resolver uses, scored rather than filtered by personal state.

use anyhow::{Context, Result};
use common::Config;
use sqlx::SqlitePool;

use crate::db;
use crate::feed_resolver::{self, ResolveParams};
use crate::models::{NewsItem, User};

/// Top-K items ranked by `views_last_window + rating_weight * avg_rating`, among items
/// still approved, non-duplicate and unexpired.
pub async fn trending(pool: &SqlitePool, config: &Config, limit: i64) -> Result<Vec<NewsItem>> {
    let since = (chrono::Utc::now() - chrono::Duration::hours(config.trending.window_hours)).to_rfc3339();

    let candidates: Vec<i64> = sqlx::query_scalar(
        r#"SELECT id FROM news_items
           WHERE moderation_status = 'approved' AND is_duplicate = 0 AND expires_at > ?"#,
    )
    .bind(chrono::Utc::now().to_rfc3339())
    .fetch_all(pool)
    .await
    .context("fetch trending candidates")?;

    let mut scored = Vec::with_capacity(candidates.len());
    for news_id in candidates {
        let views: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM interactions WHERE news_id = ? AND action = 'view' AND created_at >= ?",
        )
        .bind(news_id)
        .bind(&since)
        .fetch_one(pool)
        .await
        .context("count recent views")?;

        let avg_rating = db::ratings::average_since(pool, news_id, &since).await?.unwrap_or(0.0);
        let score = views as f64 + config.trending.rating_weight * avg_rating;
        scored.push((news_id, score));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit.max(0) as usize);

    let mut items = Vec::with_capacity(scored.len());
    for (news_id, _) in scored {
        items.push(db::news::get(pool, news_id).await?);
    }
    Ok(items)
}

/// Simple heuristic recommendation: the user's resolved feed, a page deeper than what the
/// chat front-end would normally display, so it surfaces items the user hasn't scrolled to
/// yet rather than repeating their current view.
pub async fn recommend(pool: &SqlitePool, config: &Config, user: &User, limit: i64) -> Result<Vec<NewsItem>> {
    let params = ResolveParams {
        limit,
        offset: 0,
        since: None,
    };
    feed_resolver::resolve(pool, config, user, params).await
}
