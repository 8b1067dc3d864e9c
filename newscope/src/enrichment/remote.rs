use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::Tone;

use super::{Classification, DuplicateDetection, EnrichmentProvider, FakeDetection, SentimentResult};

/// Enrichment provider backed by an OpenAI-compatible chat completions endpoint.
pub struct RemoteEnrichmentProvider {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl RemoteEnrichmentProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(timeout_secs),
            client: reqwest::Client::new(),
        }
    }

    async fn complete(&self, prompt: String, max_tokens: usize, temperature: f32) -> Result<String> {
        let req_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
        };

        let response = tokio::time::timeout(
            self.timeout,
            self.client
                .post(&self.base_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&req_body)
                .send(),
        )
        .await
        .context("enrichment request timed out")?
        .context("enrichment HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("enrichment API error {}: {}", status, body);
        }

        let resp_body: ChatResponse = response.json().await.context("failed to parse enrichment response")?;
        let choice = resp_body.choices.first().context("enrichment response has no choices")?;
        Ok(choice.message.content.clone())
    }

    async fn complete_json<T: for<'de> Deserialize<'de>>(&self, prompt: String, max_tokens: usize) -> Result<T> {
        let content = self.complete(prompt, max_tokens, 0.3).await?;
        let cleaned = super::extract_json_from_text(&content).context("no valid JSON found in enrichment response")?;
        serde_json::from_str(&cleaned).with_context(|| format!("failed to parse enrichment JSON: {}", cleaned))
    }
}

#[async_trait::async_trait]
impl EnrichmentProvider for RemoteEnrichmentProvider {
    async fn summarize(&self, _news_id: i64, text: &str) -> Result<String> {
        let prompt = format!(
            "Summarize the following news article in 2-4 sentences, in its original language:\n\n{}",
            text
        );
        self.complete(prompt, 400, 0.5).await
    }

    async fn classify(&self, text: &str) -> Result<Classification> {
        let prompt = format!(
            r#"Classify this news article into topics. Respond with strict JSON: {{"topics": ["topic1", "topic2"]}}.

ARTICLE:
{}
"#,
            text
        );
        self.complete_json(prompt, 200).await
    }

    async fn sentiment(&self, text: &str) -> Result<SentimentResult> {
        let prompt = format!(
            r#"Analyze the tone of this news article. Respond with strict JSON:
{{"tone": "positive|negative|neutral|anxious", "score": -1.0 to 1.0}}

ARTICLE:
{}
"#,
            text
        );
        let raw: RawSentiment = self.complete_json(prompt, 100).await?;
        let tone = raw.tone.parse::<Tone>().unwrap_or(Tone::Neutral);
        Ok(SentimentResult { tone, score: raw.score })
    }

    async fn detect_fake(&self, _news_id: i64, text: &str) -> Result<FakeDetection> {
        let prompt = format!(
            r#"Assess whether this article shows signs of being fabricated or misleading. Respond with strict JSON:
{{"is_fake": true|false, "confidence": 0.0 to 1.0}}

ARTICLE:
{}
"#,
            text
        );
        self.complete_json(prompt, 100).await
    }

    async fn detect_duplicate(&self, _news_id: i64, title: &str, text: &str) -> Result<DuplicateDetection> {
        let prompt = format!(
            r#"Does this look like a re-publication of widely syndicated wire content? Respond with strict JSON:
{{"is_duplicate": true|false, "potential_matches": []}}

TITLE: {}
ARTICLE:
{}
"#,
            title, text
        );
        self.complete_json(prompt, 150).await
    }

    async fn translate(&self, text: &str, target_lang: &str, source_lang: Option<&str>) -> Result<String> {
        let prompt = match source_lang {
            Some(src) => format!("Translate the following text from {} to {}. Only output the translation:\n\n{}", src, target_lang, text),
            None => format!("Translate the following text to {}. Only output the translation:\n\n{}", target_lang, text),
        };
        self.complete(prompt, 800, 0.3).await
    }

    async fn rewrite_headline(&self, text: &str) -> Result<String> {
        let prompt = format!("Rewrite this headline to be clearer and more neutral, at most 100 characters. Only output the headline:\n\n{}", text);
        self.complete(prompt, 60, 0.5).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct RawSentiment {
    tone: String,
    score: f64,
}
