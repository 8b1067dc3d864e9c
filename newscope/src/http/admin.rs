use rocket::serde::json::Json;
use rocket::post;
use rocket::State;
use serde::Deserialize;

use crate::error::AppError;
use crate::moderation;

use super::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    ApproveNews,
    RejectNews,
    ApproveComment,
    RejectComment,
    BlockSource,
    UnblockSource,
}

#[derive(Deserialize)]
pub struct ModerateRequest {
    pub admin_user_id: i64,
    pub action_type: ModerationAction,
    pub target_id: i64,
}

#[post("/admin/moderate", data = "<body>")]
pub async fn moderate(state: &State<AppState>, body: Json<ModerateRequest>) -> Result<(), AppError> {
    let body = body.into_inner();
    match body.action_type {
        ModerationAction::ApproveNews => moderation::approve_news(&state.db, body.admin_user_id, body.target_id).await,
        ModerationAction::RejectNews => moderation::reject_news(&state.db, body.admin_user_id, body.target_id).await,
        ModerationAction::ApproveComment => moderation::approve_comment(&state.db, body.admin_user_id, body.target_id).await,
        ModerationAction::RejectComment => moderation::reject_comment(&state.db, body.admin_user_id, body.target_id).await,
        ModerationAction::BlockSource => moderation::block_source(&state.db, body.admin_user_id, body.target_id).await,
        ModerationAction::UnblockSource => moderation::unblock_source(&state.db, body.admin_user_id, body.target_id).await,
    }
}
