use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::Filter;

pub async fn get(pool: &SqlitePool, user_id: i64) -> Result<Filter> {
    let row: Option<(Option<String>, Option<String>, Option<String>, Option<String>, Option<String>, Option<String>)> =
        sqlx::query_as(
            "SELECT tag, category, source, language, country, content_type FROM filters WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("fetch filter")?;

    Ok(match row {
        Some((tag, category, source, language, country, content_type)) => Filter {
            tag,
            category,
            source,
            language,
            country,
            content_type,
        },
        None => Filter::default(),
    })
}

/// Any field passed as `Some` overwrites; `None` leaves the existing value untouched.
pub async fn update(pool: &SqlitePool, user_id: i64, patch: Filter) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO filters (user_id, tag, category, source, language, country, content_type)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            tag = COALESCE(excluded.tag, filters.tag),
            category = COALESCE(excluded.category, filters.category),
            source = COALESCE(excluded.source, filters.source),
            language = COALESCE(excluded.language, filters.language),
            country = COALESCE(excluded.country, filters.country),
            content_type = COALESCE(excluded.content_type, filters.content_type)
        "#,
    )
    .bind(user_id)
    .bind(patch.tag)
    .bind(patch.category)
    .bind(patch.source)
    .bind(patch.language)
    .bind(patch.country)
    .bind(patch.content_type)
    .execute(pool)
    .await
    .context("update filter")?;
    Ok(())
}

pub async fn reset(pool: &SqlitePool, user_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM filters WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await
        .context("reset filter")?;
    Ok(())
}
