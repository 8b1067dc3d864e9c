//! Ingestion Pipeline: synchronous submission into persistence + a bounded enrichment queue,
//! and the background worker that drains it. Structured the way the single-binary main loop's
//! `run_worker` is: a `tokio::select!` between real work and a shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use common::Config;
use sqlx::SqlitePool;
use tokio::sync::{mpsc, Notify};
use tracing::{error, info, warn};

use crate::db;
use crate::enrichment::EnrichmentProvider;
use crate::error::AppError;
use crate::models::{MediaType, ModerationStatus, NewsItem, SourceType};

/// Handle held by the HTTP layer to submit work into the bounded queue without blocking on
/// enrichment itself.
#[derive(Clone)]
pub struct IngestionHandle {
    sender: mpsc::Sender<i64>,
}

pub struct NewsRequest {
    pub title: String,
    pub content: String,
    pub lang: String,
    pub country: Option<String>,
    pub tags: Vec<String>,
    pub source: String,
    pub link: Option<String>,
    pub file_id: Option<String>,
    pub media_type: Option<MediaType>,
    pub published_at: Option<chrono::DateTime<Utc>>,
    pub source_type: Option<SourceType>,
}

impl IngestionHandle {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<i64>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Validates, persists and enqueues. Fails fast with `Overloaded` when the bounded queue
    /// is full or the worker has gone away - the caller cannot tell those apart and doesn't
    /// need to.
    pub async fn submit(&self, pool: &SqlitePool, config: &Config, req: NewsRequest) -> Result<i64, AppError> {
        if req.title.trim().is_empty() {
            return Err(AppError::validation("title is required"));
        }
        if req.content.trim().is_empty() {
            return Err(AppError::validation("content is required"));
        }
        if req.lang.trim().is_empty() {
            return Err(AppError::validation("lang is required"));
        }

        let source_type = req.source_type.unwrap_or(SourceType::Manual);
        let published_at = req.published_at.unwrap_or_else(Utc::now);
        let expires_at = published_at + ChronoDuration::hours(config.ingestion.default_ttl_hours);
        let moderation_status = if config
            .ingestion
            .trusted_source_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&source_type.to_string()))
        {
            ModerationStatus::Approved
        } else {
            ModerationStatus::Pending
        };

        let news_id = db::news::insert(
            pool,
            db::news::NewSubmission {
                title: req.title,
                content: req.content,
                lang: req.lang,
                country: req.country,
                tags: req.tags,
                source: req.source,
                link: req.link,
                file_id: req.file_id,
                media_type: req.media_type.unwrap_or(MediaType::None),
                published_at,
                expires_at,
                source_type,
                moderation_status,
            },
        )
        .await
        .map_err(AppError::Internal)?;

        match self.sender.try_send(news_id) {
            Ok(()) => Ok(news_id),
            Err(mpsc::error::TrySendError::Full(_)) => Err(AppError::Overloaded),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(AppError::Overloaded),
        }
    }
}

const OPERATIONS: &[&str] = &["classify", "sentiment", "detect_duplicate", "detect_fake"];

/// Drains the enrichment queue until `shutdown` fires. Runs the four enrichment operations
/// in order for each item; a transient failure is retried with exponential backoff up to
/// `config.ingestion.max_retries`, a permanent one is logged and the item is left partially
/// enriched - resolver visibility never depends on enrichment having completed.
pub async fn run_worker(
    pool: SqlitePool,
    config: Arc<Config>,
    provider: Arc<dyn EnrichmentProvider>,
    mut receiver: mpsc::Receiver<i64>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            item = receiver.recv() => {
                match item {
                    Some(news_id) => process_one(&pool, &config, provider.as_ref(), news_id).await,
                    None => {
                        info!("ingestion queue closed, worker exiting");
                        break;
                    }
                }
            }
            _ = shutdown.notified() => {
                info!("ingestion worker received shutdown signal");
                break;
            }
        }
    }
}

async fn process_one(pool: &SqlitePool, config: &Config, provider: &dyn EnrichmentProvider, news_id: i64) {
    let item = match db::news::get(pool, news_id).await {
        Ok(item) => item,
        Err(e) => {
            error!(news_id, error = %e, "failed to load news item for enrichment");
            return;
        }
    };

    for operation in OPERATIONS {
        if let Err(e) = run_operation(pool, config, provider, news_id, &item, operation).await {
            warn!(news_id, operation, error = %e, "enrichment operation failed permanently, continuing with partial enrichment");
        }
    }
}

async fn run_operation(
    pool: &SqlitePool,
    config: &Config,
    provider: &dyn EnrichmentProvider,
    news_id: i64,
    item: &NewsItem,
    operation: &str,
) -> Result<()> {
    db::enrichment_jobs::create_pending(pool, news_id, operation).await?;

    loop {
        db::enrichment_jobs::mark_running(pool, news_id, operation).await?;
        match apply_operation(pool, provider, news_id, item, operation).await {
            Ok(()) => {
                db::enrichment_jobs::mark_completed(pool, news_id, operation).await?;
                return Ok(());
            }
            Err(e) => {
                let attempts = db::enrichment_jobs::attempts(pool, news_id, operation).await?;
                db::enrichment_jobs::mark_failed(pool, news_id, operation, &e.to_string()).await?;
                if attempts >= config.ingestion.max_retries {
                    return Err(e);
                }
                let backoff = config.ingestion.retry_base_delay_ms * 2u64.pow(attempts);
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
        }
    }
}

/// Executes one enrichment operation and writes its result. Every write is conditional
/// (only overwrites a still-null column), so repeating this for an already-applied operation
/// is safe.
async fn apply_operation(
    pool: &SqlitePool,
    provider: &dyn EnrichmentProvider,
    news_id: i64,
    item: &NewsItem,
    operation: &str,
) -> Result<()> {
    match operation {
        "classify" => {
            let classification = provider.classify(&item.content).await?;
            db::news::apply_classification(pool, news_id, &classification.topics).await?;
        }
        "sentiment" => {
            let sentiment = provider.sentiment(&item.content).await?;
            db::news::apply_sentiment(pool, news_id, sentiment.tone, sentiment.score).await?;
        }
        "detect_duplicate" => {
            let detection = provider.detect_duplicate(news_id, &item.title, &item.content).await?;
            db::news::mark_duplicate(pool, news_id, detection.is_duplicate).await?;
        }
        "detect_fake" => {
            let detection = provider.detect_fake(news_id, &item.content).await?;
            db::news::apply_fake_flag(pool, news_id, detection.is_fake).await?;
        }
        other => warn!(operation = other, "unknown enrichment operation, skipping"),
    }
    Ok(())
}
