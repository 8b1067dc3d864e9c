use rocket::serde::json::Json;
use rocket::{get, post};
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::AppError;
use crate::feed_resolver::{self, ResolveParams};
use crate::ingestion::NewsRequest;
use crate::models::{MediaType, NewsItem, SourceType};

use super::state::AppState;

#[derive(Deserialize)]
pub struct AddNewsRequest {
    pub title: String,
    pub content: String,
    pub lang: String,
    pub country: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source: String,
    pub link: Option<String>,
    pub file_id: Option<String>,
    pub media_type: Option<MediaType>,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub source_type: Option<SourceType>,
}

#[derive(Serialize)]
pub struct AddNewsResponse {
    news_id: i64,
}

#[post("/news/add", data = "<body>")]
pub async fn add(state: &State<AppState>, body: Json<AddNewsRequest>) -> Result<Json<AddNewsResponse>, AppError> {
    let body = body.into_inner();
    let news_id = state
        .ingestion
        .submit(
            &state.db,
            &state.config,
            NewsRequest {
                title: body.title,
                content: body.content,
                lang: body.lang,
                country: body.country,
                tags: body.tags,
                source: body.source,
                link: body.link,
                file_id: body.file_id,
                media_type: body.media_type,
                published_at: body.published_at,
                source_type: body.source_type,
            },
        )
        .await?;
    Ok(Json(AddNewsResponse { news_id }))
}

#[get("/news/<user_id>?<limit>&<offset>")]
pub async fn list(
    state: &State<AppState>,
    user_id: i64,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<Json<Vec<NewsItem>>, AppError> {
    let user = db::users::get_by_id(&state.db, user_id).await?;
    let params = ResolveParams {
        limit: limit.unwrap_or(20),
        offset: offset.unwrap_or(0),
        since: None,
    };
    let items = feed_resolver::resolve(&state.db, &state.config, &user, params).await?;
    Ok(Json(items))
}

#[get("/news/search?<query>&<user_id>&<limit>&<offset>")]
pub async fn search(
    state: &State<AppState>,
    query: String,
    user_id: Option<i64>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<Json<Vec<NewsItem>>, AppError> {
    let user = match user_id {
        Some(id) => Some(db::users::get_by_id(&state.db, id).await?),
        None => None,
    };
    let items = db::news::search(
        &state.db,
        &state.config,
        &query,
        user.as_ref(),
        limit.unwrap_or(20),
        offset.unwrap_or(0),
    )
    .await?;
    Ok(Json(items))
}
