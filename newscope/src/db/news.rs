use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::Config;
use sqlx::sqlite::Sqlite;
use sqlx::{QueryBuilder, SqlitePool};

use crate::models::{MediaType, ModerationStatus, NewsItem, SourceType, Tone, User};

use super::{now_str, parse_dt};

#[derive(sqlx::FromRow)]
pub(crate) struct NewsRow {
    id: i64,
    title: String,
    content: String,
    lang: String,
    country: Option<String>,
    source: String,
    link: Option<String>,
    media_type: String,
    file_id: Option<String>,
    published_at: String,
    expires_at: String,
    tone: Option<String>,
    sentiment_score: Option<f64>,
    is_fake: Option<i64>,
    is_duplicate: i64,
    moderation_status: String,
    source_type: String,
}

pub struct NewSubmission {
    pub title: String,
    pub content: String,
    pub lang: String,
    pub country: Option<String>,
    pub tags: Vec<String>,
    pub source: String,
    pub link: Option<String>,
    pub file_id: Option<String>,
    pub media_type: MediaType,
    pub published_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub source_type: SourceType,
    pub moderation_status: ModerationStatus,
}

pub(crate) async fn hydrate_many(pool: &SqlitePool, rows: Vec<NewsRow>) -> Result<Vec<NewsItem>> {
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(hydrate(pool, row).await?);
    }
    Ok(items)
}

async fn hydrate(pool: &SqlitePool, row: NewsRow) -> Result<NewsItem> {
    let tags: Vec<String> = sqlx::query_scalar("SELECT tag FROM news_tags WHERE news_id = ?")
        .bind(row.id)
        .fetch_all(pool)
        .await
        .context("fetch news tags")?;

    let topics: Vec<String> = sqlx::query_scalar("SELECT topic FROM news_topics WHERE news_id = ?")
        .bind(row.id)
        .fetch_all(pool)
        .await
        .context("fetch news topics")?;

    Ok(NewsItem {
        id: row.id,
        title: row.title,
        content: row.content,
        lang: row.lang,
        country: row.country,
        tags,
        ai_classified_topics: topics,
        source: row.source,
        link: row.link,
        media_type: row.media_type.parse().unwrap_or(MediaType::None),
        file_id: row.file_id,
        published_at: parse_dt(&row.published_at)?,
        expires_at: parse_dt(&row.expires_at)?,
        tone: row.tone.and_then(|t| t.parse::<Tone>().ok()),
        sentiment_score: row.sentiment_score,
        is_fake: row.is_fake.map(|v| v != 0),
        is_duplicate: row.is_duplicate != 0,
        moderation_status: row.moderation_status.parse().unwrap_or(ModerationStatus::Pending),
        source_type: row.source_type.parse().unwrap_or(SourceType::Manual),
    })
}

pub async fn insert(pool: &SqlitePool, item: NewSubmission) -> Result<i64> {
    let mut tx = pool.begin().await.context("begin insert news tx")?;

    let news_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO news_items (title, content, lang, country, source, link, media_type, file_id,
                                 published_at, expires_at, moderation_status, source_type)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&item.title)
    .bind(&item.content)
    .bind(&item.lang)
    .bind(&item.country)
    .bind(&item.source)
    .bind(&item.link)
    .bind(item.media_type.to_string())
    .bind(&item.file_id)
    .bind(item.published_at.to_rfc3339())
    .bind(item.expires_at.to_rfc3339())
    .bind(item.moderation_status.to_string())
    .bind(item.source_type.to_string())
    .fetch_one(&mut *tx)
    .await
    .context("insert news item")?;

    for tag in &item.tags {
        sqlx::query("INSERT OR IGNORE INTO news_tags (news_id, tag) VALUES (?, ?)")
            .bind(news_id)
            .bind(tag)
            .execute(&mut *tx)
            .await
            .context("insert news tag")?;
    }

    tx.commit().await.context("commit insert news tx")?;
    Ok(news_id)
}

pub async fn get(pool: &SqlitePool, news_id: i64) -> Result<NewsItem> {
    let row: NewsRow = sqlx::query_as(
        r#"SELECT id, title, content, lang, country, source, link, media_type, file_id,
                  published_at, expires_at, tone, sentiment_score, is_fake, is_duplicate,
                  moderation_status, source_type
           FROM news_items WHERE id = ?"#,
    )
    .bind(news_id)
    .fetch_one(pool)
    .await
    .context("fetch news item")?;

    hydrate(pool, row).await
}

/// Conditional enrichment write: only overwrites columns that are still null, so repeated
/// (idempotent) calls from a retried worker never clobber a concurrent update.
pub async fn apply_classification(pool: &SqlitePool, news_id: i64, topics: &[String]) -> Result<()> {
    for topic in topics {
        sqlx::query("INSERT OR IGNORE INTO news_topics (news_id, topic) VALUES (?, ?)")
            .bind(news_id)
            .bind(topic)
            .execute(pool)
            .await
            .context("insert news topic")?;
    }
    Ok(())
}

pub async fn apply_sentiment(pool: &SqlitePool, news_id: i64, tone: Tone, score: f64) -> Result<()> {
    sqlx::query(
        "UPDATE news_items SET tone = COALESCE(tone, ?), sentiment_score = COALESCE(sentiment_score, ?) WHERE id = ?",
    )
    .bind(tone.to_string())
    .bind(score)
    .bind(news_id)
    .execute(pool)
    .await
    .context("apply sentiment")?;
    Ok(())
}

pub async fn apply_fake_flag(pool: &SqlitePool, news_id: i64, is_fake: bool) -> Result<()> {
    sqlx::query("UPDATE news_items SET is_fake = COALESCE(is_fake, ?) WHERE id = ?")
        .bind(is_fake as i64)
        .bind(news_id)
        .execute(pool)
        .await
        .context("apply fake flag")?;
    Ok(())
}

pub async fn mark_duplicate(pool: &SqlitePool, news_id: i64, is_duplicate: bool) -> Result<()> {
    sqlx::query("UPDATE news_items SET is_duplicate = ? WHERE id = ?")
        .bind(is_duplicate as i64)
        .bind(news_id)
        .execute(pool)
        .await
        .context("mark duplicate")?;
    Ok(())
}

pub async fn set_moderation_status(pool: &SqlitePool, news_id: i64, status: ModerationStatus) -> Result<()> {
    sqlx::query("UPDATE news_items SET moderation_status = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(news_id)
        .execute(pool)
        .await
        .context("set moderation status")?;
    Ok(())
}

/// Substring match on title/content, plus an exact set-membership match against tags and
/// ai_classified_topics - a bare word query like "sports" also catches items tagged that way
/// even when the word itself never appears in the body text. Freshness is mandatory, same
/// base predicate as the Feed Resolver. When `user` is given, the same blocklist and
/// safe-mode predicates the resolver applies are composed in here too.
pub async fn search(
    pool: &SqlitePool,
    config: &Config,
    query: &str,
    user: Option<&User>,
    limit: i64,
    offset: i64,
) -> Result<Vec<NewsItem>> {
    let pattern = format!("%{}%", query);

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"SELECT DISTINCT id, title, content, lang, country, source, link, media_type, file_id,
                  published_at, expires_at, tone, sentiment_score, is_fake, is_duplicate,
                  moderation_status, source_type
           FROM news_items
           WHERE expires_at > "#,
    );
    qb.push_bind(Utc::now().to_rfc3339());
    qb.push(" AND is_duplicate = 0 AND moderation_status = 'approved' AND (title LIKE ");
    qb.push_bind(pattern.clone());
    qb.push(" OR content LIKE ");
    qb.push_bind(pattern);
    qb.push(" OR id IN (SELECT news_id FROM news_tags WHERE tag = ");
    qb.push_bind(query.to_string());
    qb.push(") OR id IN (SELECT news_id FROM news_topics WHERE topic = ");
    qb.push_bind(query.to_string());
    qb.push("))");

    if let Some(user) = user {
        let blocks = super::blocks::list_for_user(pool, user.id).await?;
        for block in &blocks {
            let column = match block.block_type {
                crate::models::BlockType::Source => Some("source"),
                crate::models::BlockType::Language => Some("lang"),
                crate::models::BlockType::Tag | crate::models::BlockType::Category => None,
            };
            match column {
                Some(column) => {
                    qb.push(format!(" AND {} <> ", column));
                    qb.push_bind(block.value.clone());
                }
                None => {
                    qb.push(" AND id NOT IN (SELECT news_id FROM news_tags WHERE tag = ");
                    qb.push_bind(block.value.clone());
                    qb.push(" UNION SELECT news_id FROM news_topics WHERE topic = ");
                    qb.push_bind(block.value.clone());
                    qb.push(")");
                }
            }
        }

        if user.safe_mode {
            qb.push(" AND (tone IS NULL OR tone NOT IN ('negative', 'anxious'))");
            if !config.safe_mode.nsfw_tags.is_empty() {
                qb.push(" AND id NOT IN (SELECT news_id FROM news_tags WHERE tag IN (");
                let mut sep = qb.separated(", ");
                for tag in &config.safe_mode.nsfw_tags {
                    sep.push_bind(tag.clone());
                }
                qb.push(") UNION SELECT news_id FROM news_topics WHERE topic IN (");
                let mut sep2 = qb.separated(", ");
                for tag in &config.safe_mode.nsfw_tags {
                    sep2.push_bind(tag.clone());
                }
                qb.push("))");
            }
        }
    }

    qb.push(" ORDER BY published_at DESC, id DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build_query_as::<NewsRow>().fetch_all(pool).await.context("search news")?;
    hydrate_many(pool, rows).await
}

/// Items whose freshness window has closed, for the cleanup sweep.
pub async fn expired_ids(pool: &SqlitePool) -> Result<Vec<i64>> {
    let now = now_str();
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM news_items WHERE expires_at < ?")
        .bind(now)
        .fetch_all(pool)
        .await
        .context("fetch expired news ids")?;
    Ok(ids)
}

pub async fn delete_if_not_bookmarked(pool: &SqlitePool, news_id: i64) -> Result<bool> {
    let bookmarked: Option<i64> = sqlx::query_scalar("SELECT 1 FROM bookmarks WHERE news_id = ? LIMIT 1")
        .bind(news_id)
        .fetch_optional(pool)
        .await
        .context("check bookmark before delete")?;

    if bookmarked.is_some() {
        return Ok(false);
    }

    sqlx::query("DELETE FROM news_tags WHERE news_id = ?").bind(news_id).execute(pool).await?;
    sqlx::query("DELETE FROM news_topics WHERE news_id = ?").bind(news_id).execute(pool).await?;
    sqlx::query("DELETE FROM news_items WHERE id = ?")
        .bind(news_id)
        .execute(pool)
        .await
        .context("delete expired news item")?;
    Ok(true)
}
