use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde::{Deserialize, Serialize};

use crate::db;
use crate::error::AppError;
use crate::models::{User, ViewMode};

use super::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub user_id: String,
    pub language: Option<String>,
    pub country: Option<String>,
    pub safe_mode: Option<bool>,
    pub is_premium: Option<bool>,
    pub email: Option<String>,
    pub auto_notifications: Option<bool>,
    pub view_mode: Option<ViewMode>,
}

#[post("/users/register", data = "<body>")]
pub async fn register(state: &State<AppState>, body: Json<RegisterRequest>) -> Result<Json<User>, AppError> {
    let body = body.into_inner();
    let user = db::users::register(
        &state.db,
        db::users::RegisterParams {
            external_id: body.user_id,
            language: body.language,
            country: body.country,
            safe_mode: body.safe_mode,
            is_premium: body.is_premium,
            auto_notifications: body.auto_notifications,
            email: body.email,
            view_mode: body.view_mode,
            registration_premium_days: state.config.premium.registration_premium_days,
        },
    )
    .await?;
    Ok(Json(user))
}

#[derive(Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    user: User,
    effective_is_premium: bool,
}

#[get("/users/<user_id>/profile")]
pub async fn profile(state: &State<AppState>, user_id: i64) -> Result<Json<ProfileResponse>, AppError> {
    let user = db::users::get_by_id(&state.db, user_id).await?;
    let effective_is_premium = user.effective_is_premium(chrono::Utc::now());
    Ok(Json(ProfileResponse { user, effective_is_premium }))
}
