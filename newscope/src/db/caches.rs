//! Caches for expensive enrichment operations triggered interactively from the HTTP layer
//! (as opposed to the ingestion worker's per-item background enrichment).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::now_str;

pub async fn get_summary(pool: &SqlitePool, news_id: i64) -> Result<Option<String>> {
    sqlx::query_scalar("SELECT summary FROM summary_cache WHERE news_id = ?")
        .bind(news_id)
        .fetch_optional(pool)
        .await
        .context("fetch cached summary")
}

pub async fn put_summary(pool: &SqlitePool, news_id: i64, summary: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO summary_cache (news_id, summary, created_at) VALUES (?, ?, ?)
        ON CONFLICT(news_id) DO UPDATE SET summary = excluded.summary, created_at = excluded.created_at
        "#,
    )
    .bind(news_id)
    .bind(summary)
    .bind(now_str())
    .execute(pool)
    .await
    .context("store cached summary")?;
    Ok(())
}

pub fn text_hash(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}

pub async fn get_translation(pool: &SqlitePool, text: &str, source_lang: &str, target_lang: &str) -> Result<Option<String>> {
    sqlx::query_scalar(
        "SELECT translated FROM translation_cache WHERE text_hash = ? AND source_lang = ? AND target_lang = ?",
    )
    .bind(text_hash(text))
    .bind(source_lang)
    .bind(target_lang)
    .fetch_optional(pool)
    .await
    .context("fetch cached translation")
}

pub async fn put_translation(pool: &SqlitePool, text: &str, source_lang: &str, target_lang: &str, translated: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO translation_cache (text_hash, source_lang, target_lang, translated, created_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(text_hash, source_lang, target_lang) DO UPDATE SET translated = excluded.translated
        "#,
    )
    .bind(text_hash(text))
    .bind(source_lang)
    .bind(target_lang)
    .bind(translated)
    .bind(now_str())
    .execute(pool)
    .await
    .context("store cached translation")?;
    Ok(())
}
