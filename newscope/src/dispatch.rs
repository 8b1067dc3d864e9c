//! Front-End Dispatch Client (C10): delivers digests and single-item alerts to the chat
//! front-end over HTTP. Kept as a narrow trait so the scheduler never depends on the
//! transport directly, and so tests can swap in a no-op implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::models::NewsItem;

#[async_trait]
pub trait ChatDispatcher: Send + Sync {
    async fn send_digest(&self, user_external_id: &str, items: &[NewsItem]) -> Result<()>;
    async fn send_single(&self, user_external_id: &str, item: &NewsItem) -> Result<()>;
}

#[derive(Serialize)]
struct DigestPayload<'a> {
    user_external_id: &'a str,
    items: &'a [NewsItem],
}

#[derive(Serialize)]
struct SinglePayload<'a> {
    user_external_id: &'a str,
    item: &'a NewsItem,
}

pub struct HttpChatDispatcher {
    base_url: String,
    client: reqwest::Client,
}

impl HttpChatDispatcher {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl ChatDispatcher for HttpChatDispatcher {
    async fn send_digest(&self, user_external_id: &str, items: &[NewsItem]) -> Result<()> {
        let url = format!("{}/dispatch/digest", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&DigestPayload { user_external_id, items })
            .send()
            .await
            .context("digest dispatch request failed")?;
        if !resp.status().is_success() {
            anyhow::bail!("digest dispatch returned status {}", resp.status());
        }
        Ok(())
    }

    async fn send_single(&self, user_external_id: &str, item: &NewsItem) -> Result<()> {
        let url = format!("{}/dispatch/single", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&SinglePayload { user_external_id, item })
            .send()
            .await
            .context("single dispatch request failed")?;
        if !resp.status().is_success() {
            anyhow::bail!("single dispatch returned status {}", resp.status());
        }
        Ok(())
    }
}

/// Used when no chat front-end base URL is configured - dispatch becomes a logged no-op
/// instead of a hard dependency on an external service being reachable.
pub struct NullChatDispatcher;

#[async_trait]
impl ChatDispatcher for NullChatDispatcher {
    async fn send_digest(&self, user_external_id: &str, items: &[NewsItem]) -> Result<()> {
        tracing::info!(user_external_id, count = items.len(), "null dispatcher: digest suppressed");
        Ok(())
    }

    async fn send_single(&self, user_external_id: &str, item: &NewsItem) -> Result<()> {
        tracing::info!(user_external_id, item_id = item.id, "null dispatcher: single item suppressed");
        Ok(())
    }
}
