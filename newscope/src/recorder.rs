//! Interaction Recorder (C5): every user action against a news item is written as one
//! atomic unit - the append-only log row, the per-user view/read marker and the aggregate
//! counters all commit together or not at all.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::{InteractionAction, ReactionKind};

/// Records a view/like/dislike/save/skip interaction, marking the item seen for the
/// resolver's seen-set subtraction and bumping the matching `user_stats` counter.
pub async fn record_interaction(
    pool: &SqlitePool,
    user_id: i64,
    news_id: i64,
    action: InteractionAction,
    read_full: bool,
) -> Result<(), AppError> {
    let mut tx = pool.begin().await.map_err(AppError::from)?;

    db::interactions::log(&mut tx, user_id, news_id, action).await.map_err(AppError::Internal)?;

    if matches!(action, InteractionAction::View | InteractionAction::ReadFull) {
        db::interactions::mark_viewed(&mut tx, user_id, news_id, read_full).await.map_err(AppError::Internal)?;
    }

    db::stats::increment_for_action(&mut tx, user_id, action.to_string().as_str()).await.map_err(AppError::Internal)?;

    if read_full {
        db::stats::increment_for_action(&mut tx, user_id, "read_full").await.map_err(AppError::Internal)?;
    }

    match action {
        InteractionAction::Like => {
            db::reactions::upsert_in_tx(&mut tx, user_id, news_id, ReactionKind::Like).await.map_err(AppError::Internal)?;
        }
        InteractionAction::Dislike => {
            db::reactions::upsert_in_tx(&mut tx, user_id, news_id, ReactionKind::Dislike).await.map_err(AppError::Internal)?;
        }
        InteractionAction::Save => {
            db::bookmarks::add_in_tx(&mut tx, user_id, news_id).await.map_err(AppError::Internal)?;
        }
        _ => {}
    }

    tx.commit().await.map_err(AppError::from)?;
    Ok(())
}

/// Records a 1-5 star rating. Independent of the interaction log - a rating can arrive
/// without a prior view being logged through this path (e.g. a re-rate after the news
/// item aged out of the feed).
pub async fn rate(pool: &SqlitePool, user_id: i64, news_id: i64, value: i64) -> Result<(), AppError> {
    if !(1..=5).contains(&value) {
        return Err(AppError::validation("rating value must be between 1 and 5"));
    }
    db::ratings::upsert(pool, user_id, news_id, value).await.map_err(AppError::Internal)?;
    Ok(())
}

/// Records a report, optionally against a specific news item (a `news_id` of `None` is a
/// generic report). The `reported` counter is bumped either way; the append-only interaction
/// log only gets a row when there is a news item to reference.
pub async fn report(pool: &SqlitePool, user_id: i64, news_id: Option<i64>, reason: &str) -> Result<(), AppError> {
    if reason.trim().is_empty() {
        return Err(AppError::validation("report reason is required"));
    }

    let mut tx = pool.begin().await.map_err(AppError::from)?;
    if let Some(news_id) = news_id {
        db::interactions::log(&mut tx, user_id, news_id, InteractionAction::Report).await.map_err(AppError::Internal)?;
    }
    db::stats::increment_for_action(&mut tx, user_id, "report").await.map_err(AppError::Internal)?;
    tx.commit().await.map_err(AppError::from)?;

    db::reports::add(pool, user_id, news_id, reason).await.map_err(AppError::Internal)?;
    Ok(())
}

/// Adds a comment, left in `pending` moderation state until an admin approves it, and
/// bumps the commenter's `comments_count`.
pub async fn add_comment(
    pool: &SqlitePool,
    user_id: i64,
    news_id: i64,
    parent_comment_id: Option<i64>,
    content: &str,
) -> Result<i64, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::validation("comment content is required"));
    }

    let mut tx = pool.begin().await.map_err(AppError::from)?;
    db::stats::increment_comments_count(&mut tx, user_id).await.map_err(AppError::Internal)?;
    tx.commit().await.map_err(AppError::from)?;

    let comment_id = db::comments::add(pool, user_id, news_id, parent_comment_id, content)
        .await
        .map_err(AppError::Internal)?;
    Ok(comment_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new().connect("sqlite::memory:").await.unwrap();
        db::schema::ensure_schema(&pool).await.unwrap();
        sqlx::query("INSERT INTO users (id, external_id, created_at) VALUES (1, 'u1', '2024-01-01T00:00:00Z')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            r#"INSERT INTO news_items (id, title, content, lang, source, media_type, published_at, expires_at, moderation_status, source_type, created_at)
               VALUES (1, 'title', 'content', 'en', 'src', 'none', '2024-01-01T00:00:00Z', '2030-01-01T00:00:00Z', 'approved', 'manual', '2024-01-01T00:00:00Z')"#,
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn record_interaction_marks_viewed_and_bumps_stats() {
        let pool = test_pool().await;
        record_interaction(&pool, 1, 1, InteractionAction::View, false).await.unwrap();

        assert!(db::interactions::already_viewed(&pool, 1, 1).await.unwrap());
        let stats = db::stats::get(&pool, 1).await.unwrap();
        assert_eq!(stats.viewed, 1);
    }

    #[tokio::test]
    async fn rate_rejects_out_of_range_value() {
        let pool = test_pool().await;
        let err = rate(&pool, 1, 1, 9).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn like_action_also_records_reaction() {
        let pool = test_pool().await;
        record_interaction(&pool, 1, 1, InteractionAction::Like, false).await.unwrap();
        let stats = db::stats::get(&pool, 1).await.unwrap();
        assert_eq!(stats.liked_count, 1);
    }
}
