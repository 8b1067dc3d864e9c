use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::AppError;
use crate::models::NewsItem;

use super::state::AppState;

#[derive(Deserialize)]
pub struct AddBookmarkRequest {
    pub user_id: i64,
    pub news_id: i64,
}

#[post("/bookmarks/add", data = "<body>")]
pub async fn add(state: &State<AppState>, body: Json<AddBookmarkRequest>) -> Result<(), AppError> {
    let body = body.into_inner();
    db::bookmarks::add(&state.db, body.user_id, body.news_id).await?;
    Ok(())
}

#[derive(Serialize)]
pub struct BookmarkEntry {
    news_id: i64,
    title: String,
    link: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[get("/bookmarks/<user_id>")]
pub async fn list(state: &State<AppState>, user_id: i64) -> Result<Json<Vec<BookmarkEntry>>, AppError> {
    let pairs = db::bookmarks::list_for_user(&state.db, user_id).await?;
    let entries = pairs
        .into_iter()
        .map(|(bookmark, item): (_, NewsItem)| BookmarkEntry {
            news_id: bookmark.news_id,
            title: item.title,
            link: item.link,
            created_at: bookmark.created_at,
        })
        .collect();
    Ok(Json(entries))
}
