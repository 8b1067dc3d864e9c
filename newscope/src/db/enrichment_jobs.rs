use anyhow::{Context, Result};
use sqlx::SqlitePool;

use super::now_str;

/// One row per (news_id, operation) tracks idempotent retry state for the ingestion worker.
pub async fn create_pending(pool: &SqlitePool, news_id: i64, operation: &str) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO enrichment_jobs (news_id, operation, status) VALUES (?, ?, 'pending')",
    )
    .bind(news_id)
    .bind(operation)
    .execute(pool)
    .await
    .context("create enrichment job")?;
    Ok(())
}

pub async fn mark_running(pool: &SqlitePool, news_id: i64, operation: &str) -> Result<()> {
    sqlx::query(
        "UPDATE enrichment_jobs SET status = 'running', attempts = attempts + 1 WHERE news_id = ? AND operation = ?",
    )
    .bind(news_id)
    .bind(operation)
    .execute(pool)
    .await
    .context("mark enrichment job running")?;
    Ok(())
}

pub async fn mark_completed(pool: &SqlitePool, news_id: i64, operation: &str) -> Result<()> {
    sqlx::query(
        "UPDATE enrichment_jobs SET status = 'completed', completed_at = ? WHERE news_id = ? AND operation = ?",
    )
    .bind(now_str())
    .bind(news_id)
    .bind(operation)
    .execute(pool)
    .await
    .context("mark enrichment job completed")?;
    Ok(())
}

pub async fn mark_failed(pool: &SqlitePool, news_id: i64, operation: &str, error: &str) -> Result<()> {
    sqlx::query(
        "UPDATE enrichment_jobs SET status = 'failed', last_error = ? WHERE news_id = ? AND operation = ?",
    )
    .bind(error)
    .bind(news_id)
    .bind(operation)
    .execute(pool)
    .await
    .context("mark enrichment job failed")?;
    Ok(())
}

pub async fn attempts(pool: &SqlitePool, news_id: i64, operation: &str) -> Result<u32> {
    let attempts: Option<i64> = sqlx::query_scalar(
        "SELECT attempts FROM enrichment_jobs WHERE news_id = ? AND operation = ?",
    )
    .bind(news_id)
    .bind(operation)
    .fetch_optional(pool)
    .await
    .context("fetch enrichment job attempts")?;
    Ok(attempts.unwrap_or(0) as u32)
}
