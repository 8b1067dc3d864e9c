use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod json_extract;
pub mod remote;
pub mod stub;

pub use json_extract::extract_json_from_text;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SentimentResult {
    pub tone: crate::models::Tone,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FakeDetection {
    pub is_fake: bool,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateDetection {
    pub is_duplicate: bool,
    pub potential_matches: Vec<i64>,
}

/// Abstracts every ML-backed annotation the ingestion pipeline applies to a news item.
/// Every method must be safe to call more than once for the same input (idempotent).
#[async_trait::async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn summarize(&self, news_id: i64, text: &str) -> Result<String>;
    async fn classify(&self, text: &str) -> Result<Classification>;
    async fn sentiment(&self, text: &str) -> Result<SentimentResult>;
    async fn detect_fake(&self, news_id: i64, text: &str) -> Result<FakeDetection>;
    async fn detect_duplicate(&self, news_id: i64, title: &str, text: &str) -> Result<DuplicateDetection>;
    async fn translate(&self, text: &str, target_lang: &str, source_lang: Option<&str>) -> Result<String>;
    async fn rewrite_headline(&self, text: &str) -> Result<String>;
}
