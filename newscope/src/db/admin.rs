use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::SqlitePool;

use super::now_str;

pub async fn record(
    pool: &SqlitePool,
    actor_user_id: i64,
    action: &str,
    target_table: &str,
    target_id: i64,
    details: Option<&Value>,
) -> Result<()> {
    let details_json = details.map(|v| v.to_string());
    sqlx::query(
        r#"
        INSERT INTO admin_actions (actor_user_id, action, target_table, target_id, details_json, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(actor_user_id)
    .bind(action)
    .bind(target_table)
    .bind(target_id)
    .bind(details_json)
    .bind(now_str())
    .execute(pool)
    .await
    .context("record admin action")?;
    Ok(())
}
