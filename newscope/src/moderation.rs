//! Moderation (C9): news/comment/source state transitions, each paired with an audit log
//! entry in `admin_actions` naming the actor and the target.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::{ModerationStatus, SourceStatus};

pub async fn approve_news(pool: &SqlitePool, actor_user_id: i64, news_id: i64) -> Result<(), AppError> {
    db::news::set_moderation_status(pool, news_id, ModerationStatus::Approved)
        .await
        .map_err(AppError::Internal)?;
    db::admin::record(pool, actor_user_id, "approve_news", "news_items", news_id, None)
        .await
        .map_err(AppError::Internal)?;
    Ok(())
}

pub async fn reject_news(pool: &SqlitePool, actor_user_id: i64, news_id: i64) -> Result<(), AppError> {
    db::news::set_moderation_status(pool, news_id, ModerationStatus::Rejected)
        .await
        .map_err(AppError::Internal)?;
    db::admin::record(pool, actor_user_id, "reject_news", "news_items", news_id, None)
        .await
        .map_err(AppError::Internal)?;
    Ok(())
}

pub async fn approve_comment(pool: &SqlitePool, actor_user_id: i64, comment_id: i64) -> Result<(), AppError> {
    db::comments::set_moderation_status(pool, comment_id, ModerationStatus::Approved)
        .await
        .map_err(AppError::Internal)?;
    db::admin::record(pool, actor_user_id, "approve_comment", "comments", comment_id, None)
        .await
        .map_err(AppError::Internal)?;
    Ok(())
}

pub async fn reject_comment(pool: &SqlitePool, actor_user_id: i64, comment_id: i64) -> Result<(), AppError> {
    db::comments::set_moderation_status(pool, comment_id, ModerationStatus::Rejected)
        .await
        .map_err(AppError::Internal)?;
    db::admin::record(pool, actor_user_id, "reject_comment", "comments", comment_id, None)
        .await
        .map_err(AppError::Internal)?;
    Ok(())
}

pub async fn block_source(pool: &SqlitePool, actor_user_id: i64, source_id: i64) -> Result<(), AppError> {
    db::sources::set_status(pool, source_id, SourceStatus::Blocked)
        .await
        .map_err(AppError::Internal)?;
    db::admin::record(pool, actor_user_id, "block_source", "sources", source_id, None)
        .await
        .map_err(AppError::Internal)?;
    Ok(())
}

pub async fn unblock_source(pool: &SqlitePool, actor_user_id: i64, source_id: i64) -> Result<(), AppError> {
    db::sources::set_status(pool, source_id, SourceStatus::Active)
        .await
        .map_err(AppError::Internal)?;
    db::admin::record(pool, actor_user_id, "unblock_source", "sources", source_id, None)
        .await
        .map_err(AppError::Internal)?;
    Ok(())
}
