use anyhow::{Context, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::models::UserStats;

use super::{now_str, parse_dt_opt};

fn column_for(action: &str) -> Option<&'static str> {
    match action {
        "view" => Some("viewed"),
        "save" => Some("saved"),
        "report" => Some("reported"),
        "read_full" => Some("read_full_count"),
        "skip" => Some("skipped_count"),
        "like" => Some("liked_count"),
        "dislike" => Some("disliked_count"),
        _ => None,
    }
}

async fn ensure_row(tx: &mut Transaction<'_, Sqlite>, user_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO user_stats (user_id) VALUES (?)")
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .context("ensure user_stats row")?;
    Ok(())
}

/// Increments the counter matching `action` (a no-op for actions with no matching counter,
/// e.g. `read_full` also bumps `viewed` via a separate call from the caller) and refreshes
/// `last_active`. Runs inside the caller's transaction so it is atomic with the log write.
pub async fn increment_for_action(tx: &mut Transaction<'_, Sqlite>, user_id: i64, action: &str) -> Result<()> {
    ensure_row(tx, user_id).await?;
    if let Some(column) = column_for(action) {
        let sql = format!(
            "UPDATE user_stats SET {column} = {column} + 1, last_active = ? WHERE user_id = ?",
            column = column
        );
        sqlx::query(&sql)
            .bind(now_str())
            .bind(user_id)
            .execute(&mut **tx)
            .await
            .context("increment user_stats counter")?;
    } else {
        sqlx::query("UPDATE user_stats SET last_active = ? WHERE user_id = ?")
            .bind(now_str())
            .bind(user_id)
            .execute(&mut **tx)
            .await
            .context("touch last_active")?;
    }
    Ok(())
}

pub async fn increment_comments_count(tx: &mut Transaction<'_, Sqlite>, user_id: i64) -> Result<()> {
    ensure_row(tx, user_id).await?;
    sqlx::query("UPDATE user_stats SET comments_count = comments_count + 1 WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .context("increment comments_count")?;
    Ok(())
}

pub async fn increment_sources_added(pool: &SqlitePool, user_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO user_stats (user_id) VALUES (?)")
        .bind(user_id)
        .execute(pool)
        .await?;
    sqlx::query("UPDATE user_stats SET sources_added_count = sources_added_count + 1 WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .context("increment sources_added_count")?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, user_id: i64) -> Result<UserStats> {
    let row: Option<(i64, i64, i64, i64, i64, i64, i64, i64, i64, i64, Option<String>)> = sqlx::query_as(
        r#"SELECT user_id, viewed, saved, reported, read_full_count, skipped_count, liked_count,
                  disliked_count, comments_count, sources_added_count, last_active
           FROM user_stats WHERE user_id = ?"#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .context("fetch user stats")?;

    match row {
        Some((user_id, viewed, saved, reported, read_full_count, skipped_count, liked_count, disliked_count, comments_count, sources_added_count, last_active)) => {
            Ok(UserStats {
                user_id,
                viewed,
                saved,
                reported,
                read_full_count,
                skipped_count,
                liked_count,
                disliked_count,
                comments_count,
                sources_added_count,
                last_active: parse_dt_opt(last_active)?,
            })
        }
        None => Ok(UserStats {
            user_id,
            viewed: 0,
            saved: 0,
            reported: 0,
            read_full_count: 0,
            skipped_count: 0,
            liked_count: 0,
            disliked_count: 0,
            comments_count: 0,
            sources_added_count: 0,
            last_active: None,
        }),
    }
}
