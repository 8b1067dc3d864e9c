use anyhow::{Context, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Invite;

use super::{now_str, parse_dt_opt};

#[derive(sqlx::FromRow)]
struct InviteRow {
    id: i64,
    inviter_user_id: i64,
    invite_code: String,
    invited_user_id: Option<i64>,
    accepted_at: Option<String>,
}

impl InviteRow {
    fn into_model(self) -> Result<Invite> {
        Ok(Invite {
            id: self.id,
            inviter_user_id: self.inviter_user_id,
            invite_code: self.invite_code,
            invited_user_id: self.invited_user_id,
            accepted_at: parse_dt_opt(self.accepted_at)?,
        })
    }
}

pub async fn generate(pool: &SqlitePool, inviter_user_id: i64) -> Result<String> {
    let code = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO invites (inviter_user_id, invite_code) VALUES (?, ?)")
        .bind(inviter_user_id)
        .bind(&code)
        .execute(pool)
        .await
        .context("insert invite")?;
    Ok(code)
}

pub async fn get_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Invite>> {
    let row: Option<InviteRow> = sqlx::query_as(
        "SELECT id, inviter_user_id, invite_code, invited_user_id, accepted_at FROM invites WHERE invite_code = ?",
    )
    .bind(code)
    .fetch_optional(pool)
    .await
    .context("fetch invite")?;
    row.map(InviteRow::into_model).transpose()
}

/// Atomically claims the invite for `invited_user_id` iff it is still unclaimed, returning
/// whether the claim succeeded (a concurrent claim loses this race and gets `false`).
pub async fn try_accept(pool: &SqlitePool, invite_id: i64, invited_user_id: i64) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE invites SET invited_user_id = ?, accepted_at = ? WHERE id = ? AND invited_user_id IS NULL",
    )
    .bind(invited_user_id)
    .bind(now_str())
    .bind(invite_id)
    .execute(pool)
    .await
    .context("accept invite")?;
    Ok(result.rows_affected() == 1)
}
