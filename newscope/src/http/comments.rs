use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::AppError;
use crate::models::Comment;
use crate::recorder;

use super::state::AppState;

#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub user_id: i64,
    pub news_id: i64,
    pub content: String,
    pub parent_comment_id: Option<i64>,
}

#[derive(Serialize)]
pub struct AddCommentResponse {
    comment_id: i64,
}

#[post("/comments/add", data = "<body>")]
pub async fn add(state: &State<AppState>, body: Json<AddCommentRequest>) -> Result<Json<AddCommentResponse>, AppError> {
    let body = body.into_inner();
    let comment_id = recorder::add_comment(&state.db, body.user_id, body.news_id, body.parent_comment_id, &body.content).await?;
    Ok(Json(AddCommentResponse { comment_id }))
}

#[get("/comments/<news_id>")]
pub async fn list(state: &State<AppState>, news_id: i64) -> Result<Json<Vec<Comment>>, AppError> {
    let comments = db::comments::list_approved_for_news(&state.db, news_id).await?;
    Ok(Json(comments))
}
