use anyhow::{Context, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::models::ReactionKind;

pub async fn upsert(pool: &SqlitePool, user_id: i64, news_id: i64, kind: ReactionKind) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reactions (user_id, news_id, kind) VALUES (?, ?, ?)
        ON CONFLICT(user_id, news_id) DO UPDATE SET kind = excluded.kind
        "#,
    )
    .bind(user_id)
    .bind(news_id)
    .bind(kind.to_string())
    .execute(pool)
    .await
    .context("upsert reaction")?;
    Ok(())
}

/// Same upsert, against the caller's open transaction - for composing with the other
/// `record_interaction` writes so they commit or roll back together.
pub async fn upsert_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: i64,
    news_id: i64,
    kind: ReactionKind,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reactions (user_id, news_id, kind) VALUES (?, ?, ?)
        ON CONFLICT(user_id, news_id) DO UPDATE SET kind = excluded.kind
        "#,
    )
    .bind(user_id)
    .bind(news_id)
    .bind(kind.to_string())
    .execute(&mut **tx)
    .await
    .context("upsert reaction")?;
    Ok(())
}
