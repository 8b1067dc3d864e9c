use rocket::serde::json::Json;
use rocket::{post, State};
use serde::Deserialize;

use crate::db;
use crate::error::AppError;
use crate::models::{BlockType, InteractionAction};
use crate::recorder;

use super::state::AppState;

#[derive(Deserialize)]
pub struct RateRequest {
    pub user_id: i64,
    pub news_id: i64,
    pub value: i64,
}

#[post("/rate", data = "<body>")]
pub async fn rate(state: &State<AppState>, body: Json<RateRequest>) -> Result<(), AppError> {
    let body = body.into_inner();
    recorder::rate(&state.db, body.user_id, body.news_id, body.value).await
}

#[derive(Deserialize)]
pub struct BlockRequest {
    pub user_id: i64,
    pub block_type: BlockType,
    pub value: String,
}

#[post("/block", data = "<body>")]
pub async fn block(state: &State<AppState>, body: Json<BlockRequest>) -> Result<(), AppError> {
    let body = body.into_inner();
    db::blocks::add(&state.db, body.user_id, body.block_type, &body.value).await?;
    Ok(())
}

#[derive(Deserialize)]
pub struct ReportRequest {
    pub user_id: i64,
    pub news_id: Option<i64>,
    pub reason: String,
}

#[post("/report", data = "<body>")]
pub async fn report(state: &State<AppState>, body: Json<ReportRequest>) -> Result<(), AppError> {
    let body = body.into_inner();
    recorder::report(&state.db, body.user_id, body.news_id, &body.reason).await
}

#[derive(Deserialize)]
pub struct LogActivityRequest {
    pub user_id: i64,
    pub news_id: i64,
    pub action: InteractionAction,
}

#[post("/log_user_activity", data = "<body>")]
pub async fn log_user_activity(state: &State<AppState>, body: Json<LogActivityRequest>) -> Result<(), AppError> {
    let body = body.into_inner();
    let read_full = matches!(body.action, InteractionAction::ReadFull);
    recorder::record_interaction(&state.db, body.user_id, body.news_id, body.action, read_full).await
}
