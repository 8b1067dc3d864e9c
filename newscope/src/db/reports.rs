use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::now_str;

pub async fn add(pool: &SqlitePool, user_id: i64, news_id: Option<i64>, reason: &str) -> Result<()> {
    sqlx::query("INSERT INTO reports (user_id, news_id, reason, created_at) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(news_id)
        .bind(reason)
        .bind(now_str())
        .execute(pool)
        .await
        .context("insert report")?;
    Ok(())
}
