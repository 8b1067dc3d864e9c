use rocket::serde::json::Json;
use rocket::{delete, get, post, State};

use crate::db;
use crate::error::AppError;
use crate::models::Filter;

use super::state::AppState;

#[post("/filters/update", data = "<body>")]
pub async fn update(state: &State<AppState>, body: Json<FilterUpdateRequest>) -> Result<Json<Filter>, AppError> {
    let body = body.into_inner();
    db::filters::update(&state.db, body.user_id, body.patch).await?;
    let filter = db::filters::get(&state.db, body.user_id).await?;
    Ok(Json(filter))
}

#[derive(serde::Deserialize)]
pub struct FilterUpdateRequest {
    pub user_id: i64,
    #[serde(flatten)]
    pub patch: Filter,
}

#[get("/filters/<user_id>")]
pub async fn get(state: &State<AppState>, user_id: i64) -> Result<Json<Filter>, AppError> {
    let filter = db::filters::get(&state.db, user_id).await?;
    Ok(Json(filter))
}

#[delete("/filters/reset/<user_id>")]
pub async fn reset(state: &State<AppState>, user_id: i64) -> Result<(), AppError> {
    db::filters::reset(&state.db, user_id).await?;
    Ok(())
}
