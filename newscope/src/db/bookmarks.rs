use anyhow::{Context, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::models::{Bookmark, NewsItem};

use super::{now_str, parse_dt};
use super::news;

pub async fn add(pool: &SqlitePool, user_id: i64, news_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO bookmarks (user_id, news_id, created_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(news_id)
        .bind(now_str())
        .execute(pool)
        .await
        .context("insert bookmark")?;
    Ok(())
}

/// Same insert, against the caller's open transaction - for composing with the other
/// `record_interaction` writes so they commit or roll back together.
pub async fn add_in_tx(tx: &mut Transaction<'_, Sqlite>, user_id: i64, news_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO bookmarks (user_id, news_id, created_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(news_id)
        .bind(now_str())
        .execute(&mut **tx)
        .await
        .context("insert bookmark")?;
    Ok(())
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<(Bookmark, NewsItem)>> {
    let rows: Vec<(i64, i64, String)> = sqlx::query_as(
        "SELECT user_id, news_id, created_at FROM bookmarks WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("list bookmarks")?;

    let mut out = Vec::with_capacity(rows.len());
    for (user_id, news_id, created_at) in rows {
        let item = news::get(pool, news_id).await?;
        out.push((
            Bookmark {
                user_id,
                news_id,
                created_at: parse_dt(&created_at)?,
            },
            item,
        ));
    }
    Ok(out)
}
