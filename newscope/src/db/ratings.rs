use anyhow::{Context, Result};
use sqlx::SqlitePool;

pub async fn upsert(pool: &SqlitePool, user_id: i64, news_id: i64, value: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ratings (user_id, news_id, value) VALUES (?, ?, ?)
        ON CONFLICT(user_id, news_id) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(user_id)
    .bind(news_id)
    .bind(value)
    .execute(pool)
    .await
    .context("upsert rating")?;
    Ok(())
}

pub async fn average_since(pool: &SqlitePool, news_id: i64, since: &str) -> Result<Option<f64>> {
    // ratings carry no timestamp of their own; callers that need a time-windowed average
    // join through interactions instead. Kept here for a news-item-wide average.
    let _ = since;
    sqlx::query_scalar("SELECT AVG(value) FROM ratings WHERE news_id = ?")
        .bind(news_id)
        .fetch_one(pool)
        .await
        .context("average rating")
}
