use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::models::{Frequency, Subscription};

use super::{now_str, parse_dt_opt};

#[derive(sqlx::FromRow)]
struct SubRow {
    user_id: i64,
    active: i64,
    frequency: String,
    last_dispatched_at: Option<String>,
}

impl SubRow {
    fn into_model(self) -> Result<Subscription> {
        Ok(Subscription {
            user_id: self.user_id,
            active: self.active != 0,
            frequency: self.frequency.parse().unwrap_or(Frequency::Daily),
            last_dispatched_at: parse_dt_opt(self.last_dispatched_at)?,
        })
    }
}

pub async fn update(pool: &SqlitePool, user_id: i64, frequency: Frequency) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO subscriptions (user_id, active, frequency) VALUES (?, 1, ?)
        ON CONFLICT(user_id) DO UPDATE SET active = 1, frequency = excluded.frequency
        "#,
    )
    .bind(user_id)
    .bind(frequency.to_string())
    .execute(pool)
    .await
    .context("update subscription")?;
    Ok(())
}

pub async fn unsubscribe(pool: &SqlitePool, user_id: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO subscriptions (user_id, active, frequency) VALUES (?, 0, 'daily')
        ON CONFLICT(user_id) DO UPDATE SET active = 0
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await
    .context("unsubscribe")?;
    Ok(())
}

pub async fn active_by_frequency(pool: &SqlitePool, frequency: Frequency) -> Result<Vec<Subscription>> {
    let rows: Vec<SubRow> = sqlx::query_as(
        "SELECT user_id, active, frequency, last_dispatched_at FROM subscriptions WHERE active = 1 AND frequency = ?",
    )
    .bind(frequency.to_string())
    .fetch_all(pool)
    .await
    .context("list active subscriptions")?;

    rows.into_iter().map(SubRow::into_model).collect()
}

pub async fn mark_dispatched(pool: &SqlitePool, user_id: i64) -> Result<()> {
    sqlx::query("UPDATE subscriptions SET last_dispatched_at = ? WHERE user_id = ?")
        .bind(now_str())
        .bind(user_id)
        .execute(pool)
        .await
        .context("mark dispatched")?;
    Ok(())
}
