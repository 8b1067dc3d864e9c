use rocket::serde::json::Json;
use rocket::{post, State};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::referral;

use super::state::AppState;

#[derive(Deserialize)]
pub struct GenerateInviteRequest {
    pub user_id: i64,
}

#[derive(Serialize)]
pub struct GenerateInviteResponse {
    code: String,
}

#[post("/invite/generate", data = "<body>")]
pub async fn generate(state: &State<AppState>, body: Json<GenerateInviteRequest>) -> Result<Json<GenerateInviteResponse>, AppError> {
    let body = body.into_inner();
    let code = referral::generate_invite(&state.db, body.user_id).await?;
    Ok(Json(GenerateInviteResponse { code }))
}

#[derive(Deserialize)]
pub struct AcceptInviteRequest {
    pub user_id: i64,
    pub code: String,
}

#[post("/invite/accept", data = "<body>")]
pub async fn accept(state: &State<AppState>, body: Json<AcceptInviteRequest>) -> Result<(), AppError> {
    let body = body.into_inner();
    referral::accept_invite(&state.db, &state.config, body.user_id, &body.code).await
}
