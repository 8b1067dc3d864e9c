use rocket::serde::json::Json;
use rocket::{post, State};
use serde::Deserialize;

use crate::db;
use crate::error::AppError;
use crate::models::Frequency;

use super::state::AppState;

#[derive(Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub user_id: i64,
    pub frequency: Frequency,
}

#[post("/subscriptions/update", data = "<body>")]
pub async fn update(state: &State<AppState>, body: Json<UpdateSubscriptionRequest>) -> Result<(), AppError> {
    let body = body.into_inner();
    db::subscriptions::update(&state.db, body.user_id, body.frequency).await?;
    Ok(())
}

#[post("/subscriptions/unsubscribe?<user_id>")]
pub async fn unsubscribe(state: &State<AppState>, user_id: i64) -> Result<(), AppError> {
    db::subscriptions::unsubscribe(&state.db, user_id).await?;
    Ok(())
}
