use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::AppError;
use crate::models::{CustomFeed, FeedFilterClause};

use super::state::AppState;

#[derive(Deserialize)]
pub struct CreateFeedRequest {
    pub user_id: i64,
    pub feed_name: String,
    pub filters: Vec<FeedFilterClause>,
}

#[derive(Serialize)]
pub struct CreateFeedResponse {
    feed_id: i64,
}

#[post("/custom_feeds/create", data = "<body>")]
pub async fn create(state: &State<AppState>, body: Json<CreateFeedRequest>) -> Result<Json<CreateFeedResponse>, AppError> {
    let body = body.into_inner();
    let feed_id = db::custom_feeds::create(&state.db, body.user_id, &body.feed_name, &body.filters).await?;
    Ok(Json(CreateFeedResponse { feed_id }))
}

#[get("/custom_feeds/<user_id>")]
pub async fn list(state: &State<AppState>, user_id: i64) -> Result<Json<Vec<CustomFeed>>, AppError> {
    let feeds = db::custom_feeds::list_for_user(&state.db, user_id).await?;
    Ok(Json(feeds))
}

#[derive(Deserialize)]
pub struct SwitchFeedRequest {
    pub user_id: i64,
    pub feed_id: i64,
}

#[post("/custom_feeds/switch", data = "<body>")]
pub async fn switch(state: &State<AppState>, body: Json<SwitchFeedRequest>) -> Result<(), AppError> {
    let body = body.into_inner();
    let owned = db::custom_feeds::get_owned(&state.db, body.feed_id, body.user_id).await?;
    if owned.is_none() {
        return Err(AppError::forbidden("custom feed not owned by this user"));
    }
    db::users::set_current_feed(&state.db, body.user_id, Some(body.feed_id)).await?;
    Ok(())
}
