use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::NewsItem;

/// Copies a news item into `archived_news`, keyed by `original_news_id`, so the sweep is
/// idempotent: calling this twice for the same item is a no-op the second time.
pub async fn archive(pool: &SqlitePool, item: &NewsItem) -> Result<()> {
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO archived_news (original_news_id, title, content, source, published_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(item.id)
    .bind(&item.title)
    .bind(&item.content)
    .bind(&item.source)
    .bind(item.published_at.to_rfc3339())
    .execute(pool)
    .await
    .context("archive news item")?;
    Ok(())
}

pub async fn is_archived(pool: &SqlitePool, news_id: i64) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM archived_news WHERE original_news_id = ?")
        .bind(news_id)
        .fetch_optional(pool)
        .await
        .context("check archived")?;
    Ok(found.is_some())
}
