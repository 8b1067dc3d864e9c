use rocket::serde::json::Json;
use rocket::{get, State};
use serde::Serialize;

use crate::db;
use crate::discovery;
use crate::error::AppError;
use crate::models::NewsItem;

use super::state::AppState;

#[get("/recommend/<user_id>?<limit>")]
pub async fn recommend(state: &State<AppState>, user_id: i64, limit: Option<i64>) -> Result<Json<Vec<NewsItem>>, AppError> {
    let user = db::users::get_by_id(&state.db, user_id).await?;
    let items = discovery::recommend(&state.db, &state.config, &user, limit.unwrap_or(20)).await.map_err(AppError::Internal)?;
    Ok(Json(items))
}

#[get("/trending?<limit>")]
pub async fn trending(state: &State<AppState>, limit: Option<i64>) -> Result<Json<Vec<NewsItem>>, AppError> {
    let items = discovery::trending(&state.db, &state.config, limit.unwrap_or(20)).await.map_err(AppError::Internal)?;
    Ok(Json(items))
}

#[derive(Serialize)]
pub struct AnalyticsResponse {
    viewed: i64,
    saved: i64,
    reported: i64,
    read_full_count: i64,
    skipped_count: i64,
    liked_count: i64,
    disliked_count: i64,
    comments_count: i64,
    sources_added_count: i64,
    level: i64,
    badges: Vec<String>,
}

#[get("/analytics/<user_id>")]
pub async fn analytics(state: &State<AppState>, user_id: i64) -> Result<Json<AnalyticsResponse>, AppError> {
    let user = db::users::get_by_id(&state.db, user_id).await?;
    let stats = db::stats::get(&state.db, user_id).await?;
    Ok(Json(AnalyticsResponse {
        viewed: stats.viewed,
        saved: stats.saved,
        reported: stats.reported,
        read_full_count: stats.read_full_count,
        skipped_count: stats.skipped_count,
        liked_count: stats.liked_count,
        disliked_count: stats.disliked_count,
        comments_count: stats.comments_count,
        sources_added_count: stats.sources_added_count,
        level: user.level,
        badges: user.badges,
    }))
}
