use rocket::serde::json::Json;
use rocket::{post, State};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::AppError;
use crate::models::SourceType;

use super::state::AppState;

#[derive(Deserialize)]
pub struct AddSourceRequest {
    pub user_id: i64,
    pub name: String,
    pub link: String,
    pub source_type: SourceType,
}

#[derive(Serialize)]
pub struct AddSourceResponse {
    source_id: i64,
}

/// Registering the same `(name, link)` pair twice is a conflict, not a duplicate insert -
/// the unique index on `sources` maps straight onto `AppError::Conflict` through `?`.
#[post("/sources/add", data = "<body>")]
pub async fn add(state: &State<AppState>, body: Json<AddSourceRequest>) -> Result<Json<AddSourceResponse>, AppError> {
    let body = body.into_inner();
    let source_id = db::sources::add(&state.db, body.user_id, &body.name, &body.link, body.source_type).await?;
    db::stats::increment_sources_added(&state.db, body.user_id).await.map_err(AppError::Internal)?;
    Ok(Json(AddSourceResponse { source_id }))
}
