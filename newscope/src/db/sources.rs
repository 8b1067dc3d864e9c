use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::{Source, SourceStatus, SourceType};

#[derive(sqlx::FromRow)]
struct SourceRow {
    id: i64,
    name: String,
    link: String,
    source_type: String,
    added_by_user: Option<i64>,
    verified: i64,
    reliability_score: Option<f64>,
    status: String,
}

impl SourceRow {
    fn into_model(self) -> Source {
        Source {
            id: self.id,
            name: self.name,
            link: self.link,
            source_type: self.source_type.parse().unwrap_or(SourceType::Manual),
            added_by_user: self.added_by_user,
            verified: self.verified != 0,
            reliability_score: self.reliability_score,
            status: self.status.parse().unwrap_or(SourceStatus::Active),
        }
    }
}

pub async fn add(pool: &SqlitePool, user_id: i64, name: &str, link: &str, source_type: SourceType) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO sources (name, link, source_type, added_by_user) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(link)
    .bind(source_type.to_string())
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("insert source")?;
    Ok(id)
}

pub async fn set_status(pool: &SqlitePool, source_id: i64, status: SourceStatus) -> Result<()> {
    sqlx::query("UPDATE sources SET status = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(source_id)
        .execute(pool)
        .await
        .context("set source status")?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, source_id: i64) -> Result<Source> {
    let row: SourceRow = sqlx::query_as(
        "SELECT id, name, link, source_type, added_by_user, verified, reliability_score, status FROM sources WHERE id = ?",
    )
    .bind(source_id)
    .fetch_one(pool)
    .await
    .context("fetch source")?;
    Ok(row.into_model())
}
