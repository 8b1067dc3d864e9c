use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::Result;

use crate::models::Tone;

use super::{Classification, DuplicateDetection, EnrichmentProvider, FakeDetection, SentimentResult};

const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("politics", &["election", "government", "president", "senate", "minister"]),
    ("sports", &["match", "tournament", "championship", "goal", "score"]),
    ("technology", &["software", "ai", "robot", "startup", "app"]),
    ("business", &["market", "stock", "earnings", "revenue", "merger"]),
    ("health", &["hospital", "vaccine", "disease", "outbreak", "treatment"]),
    ("science", &["research", "study", "discovery", "telescope", "species"]),
];

const POSITIVE_WORDS: &[&str] = &["win", "record", "growth", "success", "breakthrough", "celebrate"];
const NEGATIVE_WORDS: &[&str] = &["crisis", "disaster", "attack", "crash", "death", "war", "collapse"];
const ANXIOUS_WORDS: &[&str] = &["warn", "threat", "risk", "fear", "danger", "emergency"];

/// Deterministic, dependency-free implementation used as the default provider and in tests.
/// Heuristics only - never a substitute for a real model, but it keeps the pipeline fully
/// exercisable with nothing else running.
pub struct StubEnrichmentProvider;

#[async_trait::async_trait]
impl EnrichmentProvider for StubEnrichmentProvider {
    async fn summarize(&self, _news_id: i64, text: &str) -> Result<String> {
        Ok(extractive_summary(text))
    }

    async fn classify(&self, text: &str) -> Result<Classification> {
        let lower = text.to_lowercase();
        let topics = TOPIC_KEYWORDS
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(topic, _)| topic.to_string())
            .collect();
        Ok(Classification { topics })
    }

    async fn sentiment(&self, text: &str) -> Result<SentimentResult> {
        let lower = text.to_lowercase();
        let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as i32;
        let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as i32;
        let anxious = ANXIOUS_WORDS.iter().filter(|w| lower.contains(*w)).count() as i32;

        let (tone, score) = if anxious > positive && anxious >= negative {
            (Tone::Anxious, -0.4)
        } else if negative > positive {
            (Tone::Negative, -0.6)
        } else if positive > negative {
            (Tone::Positive, 0.6)
        } else {
            (Tone::Neutral, 0.0)
        };

        Ok(SentimentResult { tone, score })
    }

    async fn detect_fake(&self, _news_id: i64, _text: &str) -> Result<FakeDetection> {
        // No real classifier behind the stub: assume genuine until a real provider says otherwise.
        Ok(FakeDetection {
            is_fake: false,
            confidence: 0.0,
        })
    }

    async fn detect_duplicate(&self, _news_id: i64, title: &str, _text: &str) -> Result<DuplicateDetection> {
        let _ = normalized_hash(title);
        // The stub has no corpus to compare against; duplicate detection is left to a real
        // provider's implementation of this contract (see SPEC_FULL.md's matching-key note).
        Ok(DuplicateDetection {
            is_duplicate: false,
            potential_matches: vec![],
        })
    }

    async fn translate(&self, text: &str, target_lang: &str, _source_lang: Option<&str>) -> Result<String> {
        Ok(format!("[{}] {}", target_lang, text))
    }

    async fn rewrite_headline(&self, text: &str) -> Result<String> {
        let first_line = text.lines().next().unwrap_or(text);
        Ok(truncate(first_line.trim(), 100))
    }
}

fn normalized_hash(title: &str) -> u64 {
    let normalized: String = title.to_lowercase().chars().filter(|c| c.is_alphanumeric()).collect();
    let mut hasher = DefaultHasher::new();
    normalized.hash(&mut hasher);
    hasher.finish()
}

fn extractive_summary(text: &str) -> String {
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(4)
        .collect();
    if sentences.is_empty() {
        return truncate(text, 280);
    }
    truncate(&sentences.join(". "), 280)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn classify_matches_keywords() {
        let provider = StubEnrichmentProvider;
        let result = provider
            .classify("The championship match ended with a dramatic goal in the final minute")
            .await
            .unwrap();
        assert!(result.topics.contains(&"sports".to_string()));
    }

    #[tokio::test]
    async fn sentiment_detects_negative_tone() {
        let provider = StubEnrichmentProvider;
        let result = provider
            .sentiment("The crisis deepened after the disaster left the region in collapse")
            .await
            .unwrap();
        assert_eq!(result.tone, Tone::Negative);
    }
}
