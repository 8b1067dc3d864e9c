use anyhow::{Context, Result};
use sqlx::{Sqlite, Transaction};

use crate::models::InteractionAction;

use super::now_str;

/// Append-only log write. Takes the enclosing transaction so the caller can compose it with
/// the view/stats writes that must commit or roll back together.
pub async fn log(tx: &mut Transaction<'_, Sqlite>, user_id: i64, news_id: i64, action: InteractionAction) -> Result<()> {
    sqlx::query("INSERT INTO interactions (user_id, news_id, action, created_at) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(news_id)
        .bind(action.to_string())
        .bind(now_str())
        .execute(&mut **tx)
        .await
        .context("insert interaction")?;
    Ok(())
}

pub async fn mark_viewed(tx: &mut Transaction<'_, Sqlite>, user_id: i64, news_id: i64, read_full: bool) -> Result<()> {
    let now = now_str();
    sqlx::query(
        r#"
        INSERT INTO user_news_views (user_id, news_id, viewed, first_viewed_at, last_viewed_at, read_full)
        VALUES (?, ?, 1, ?, ?, ?)
        ON CONFLICT(user_id, news_id) DO UPDATE SET
            viewed = 1,
            last_viewed_at = excluded.last_viewed_at,
            read_full = MAX(user_news_views.read_full, excluded.read_full)
        "#,
    )
    .bind(user_id)
    .bind(news_id)
    .bind(&now)
    .bind(&now)
    .bind(read_full as i64)
    .execute(&mut **tx)
    .await
    .context("upsert user_news_views")?;
    Ok(())
}

pub async fn already_viewed(pool: &sqlx::SqlitePool, user_id: i64, news_id: i64) -> Result<bool> {
    let viewed: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM user_news_views WHERE user_id = ? AND news_id = ? AND viewed = 1",
    )
    .bind(user_id)
    .bind(news_id)
    .fetch_optional(pool)
    .await
    .context("check viewed")?;
    Ok(viewed.is_some())
}
