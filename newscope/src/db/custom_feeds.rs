use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::{CustomFeed, FeedFilterClause};

#[derive(sqlx::FromRow)]
struct FeedRow {
    id: i64,
    user_id: i64,
    feed_name: String,
    filters_json: String,
}

impl FeedRow {
    fn into_model(self) -> CustomFeed {
        let filters: Vec<FeedFilterClause> = serde_json::from_str(&self.filters_json).unwrap_or_default();
        CustomFeed {
            id: self.id,
            user_id: self.user_id,
            feed_name: self.feed_name,
            filters,
        }
    }
}

pub async fn create(pool: &SqlitePool, user_id: i64, feed_name: &str, filters: &[FeedFilterClause]) -> Result<i64> {
    let filters_json = serde_json::to_string(filters).context("serialize feed filters")?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO custom_feeds (user_id, feed_name, filters_json) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(feed_name)
    .bind(filters_json)
    .fetch_one(pool)
    .await
    .context("create custom feed")?;
    Ok(id)
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<CustomFeed>> {
    let rows: Vec<FeedRow> = sqlx::query_as(
        "SELECT id, user_id, feed_name, filters_json FROM custom_feeds WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("list custom feeds")?;
    Ok(rows.into_iter().map(FeedRow::into_model).collect())
}

pub async fn get(pool: &SqlitePool, feed_id: i64) -> Result<Option<CustomFeed>> {
    let row: Option<FeedRow> = sqlx::query_as(
        "SELECT id, user_id, feed_name, filters_json FROM custom_feeds WHERE id = ?",
    )
    .bind(feed_id)
    .fetch_optional(pool)
    .await
    .context("fetch custom feed")?;
    Ok(row.map(FeedRow::into_model))
}

/// Returns the feed only if owned by the given user, and `None` otherwise (deleted or
/// owned-by-someone-else behave identically per the resolver's "treat as unset" invariant).
pub async fn get_owned(pool: &SqlitePool, feed_id: i64, user_id: i64) -> Result<Option<CustomFeed>> {
    Ok(get(pool, feed_id).await?.filter(|f| f.user_id == user_id))
}
