//! Interactive enrichment endpoints: unlike the ingestion pipeline's background
//! classification, these are called synchronously from the chat front-end and cache their
//! results so a repeated request for the same news item or text is free.

use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::AppError;

use super::state::AppState;

#[derive(Deserialize)]
pub struct SummaryRequest {
    pub news_id: Option<i64>,
    pub text: Option<String>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    summary: String,
}

#[post("/summary", data = "<body>")]
pub async fn summary(state: &State<AppState>, body: Json<SummaryRequest>) -> Result<Json<SummaryResponse>, AppError> {
    let body = body.into_inner();
    match (body.news_id, body.text) {
        (Some(news_id), _) => {
            if let Some(cached) = db::caches::get_summary(&state.db, news_id).await.map_err(AppError::Internal)? {
                return Ok(Json(SummaryResponse { summary: cached }));
            }
            let item = db::news::get(&state.db, news_id).await?;
            let summary = state.provider.summarize(news_id, &item.content).await.map_err(AppError::Internal)?;
            db::caches::put_summary(&state.db, news_id, &summary).await.map_err(AppError::Internal)?;
            Ok(Json(SummaryResponse { summary }))
        }
        (None, Some(text)) => {
            let summary = state.provider.summarize(0, &text).await.map_err(AppError::Internal)?;
            Ok(Json(SummaryResponse { summary }))
        }
        (None, None) => Err(AppError::validation("either news_id or text is required")),
    }
}

#[derive(Serialize)]
pub struct VerifyResponse {
    is_fake: bool,
    confidence: f64,
    source: String,
}

#[get("/verify/<news_id>")]
pub async fn verify(state: &State<AppState>, news_id: i64) -> Result<Json<VerifyResponse>, AppError> {
    let item = db::news::get(&state.db, news_id).await?;
    let detection = state.provider.detect_fake(news_id, &item.content).await.map_err(AppError::Internal)?;
    Ok(Json(VerifyResponse {
        is_fake: detection.is_fake,
        confidence: detection.confidence,
        source: item.source,
    }))
}

#[derive(Deserialize)]
pub struct RewriteHeadlineRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct RewriteHeadlineResponse {
    headline: String,
}

#[post("/ai/rewrite_headline", data = "<body>")]
pub async fn rewrite_headline(
    state: &State<AppState>,
    body: Json<RewriteHeadlineRequest>,
) -> Result<Json<RewriteHeadlineResponse>, AppError> {
    let body = body.into_inner();
    if body.text.trim().is_empty() {
        return Err(AppError::validation("text is required"));
    }
    let headline = state.provider.rewrite_headline(&body.text).await.map_err(AppError::Internal)?;
    Ok(Json(RewriteHeadlineResponse { headline }))
}

#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub target_lang: String,
    pub source_lang: Option<String>,
}

#[derive(Serialize)]
pub struct TranslateResponse {
    translated: String,
}

#[post("/translate", data = "<body>")]
pub async fn translate(state: &State<AppState>, body: Json<TranslateRequest>) -> Result<Json<TranslateResponse>, AppError> {
    let body = body.into_inner();
    if body.text.trim().is_empty() {
        return Err(AppError::validation("text is required"));
    }
    let source_lang = body.source_lang.as_deref().unwrap_or("auto");
    if let Some(cached) = db::caches::get_translation(&state.db, &body.text, source_lang, &body.target_lang)
        .await
        .map_err(AppError::Internal)?
    {
        return Ok(Json(TranslateResponse { translated: cached }));
    }
    let translated = state
        .provider
        .translate(&body.text, &body.target_lang, body.source_lang.as_deref())
        .await
        .map_err(AppError::Internal)?;
    db::caches::put_translation(&state.db, &body.text, source_lang, &body.target_lang, &translated)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(TranslateResponse { translated }))
}
