use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::{Block, BlockType};

pub async fn add(pool: &SqlitePool, user_id: i64, block_type: BlockType, value: &str) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO blocks (user_id, block_type, value) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(block_type.to_string())
        .bind(value)
        .execute(pool)
        .await
        .context("insert block")?;
    Ok(())
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Block>> {
    let rows: Vec<(i64, i64, String, String)> = sqlx::query_as(
        "SELECT id, user_id, block_type, value FROM blocks WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("list blocks")?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, user_id, block_type, value)| {
            block_type.parse().ok().map(|block_type| Block {
                id,
                user_id,
                block_type,
                value,
            })
        })
        .collect())
}
