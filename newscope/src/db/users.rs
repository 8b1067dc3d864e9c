use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::models::{User, ViewMode};

use super::{now_str, parse_dt, parse_dt_opt};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    external_id: String,
    language: Option<String>,
    country: Option<String>,
    safe_mode: i64,
    view_mode: String,
    is_premium: i64,
    premium_expires_at: Option<String>,
    auto_notifications: i64,
    email: Option<String>,
    current_feed_id: Option<i64>,
    inviter_id: Option<i64>,
    level: i64,
    badges_json: String,
    created_at: String,
}

impl UserRow {
    fn into_model(self) -> Result<User> {
        Ok(User {
            id: self.id,
            external_id: self.external_id,
            language: self.language,
            country: self.country,
            safe_mode: self.safe_mode != 0,
            view_mode: self.view_mode.parse().unwrap_or(ViewMode::Manual),
            is_premium: self.is_premium != 0,
            premium_expires_at: parse_dt_opt(self.premium_expires_at)?,
            auto_notifications: self.auto_notifications != 0,
            email: self.email,
            current_feed_id: self.current_feed_id,
            inviter_id: self.inviter_id,
            level: self.level,
            badges: serde_json::from_str(&self.badges_json).unwrap_or_default(),
            created_at: parse_dt(&self.created_at)?,
        })
    }
}

pub struct RegisterParams {
    pub external_id: String,
    pub language: Option<String>,
    pub country: Option<String>,
    pub safe_mode: Option<bool>,
    pub is_premium: Option<bool>,
    pub auto_notifications: Option<bool>,
    pub email: Option<String>,
    pub view_mode: Option<ViewMode>,
    pub registration_premium_days: i64,
}

/// Registers a new user or updates the mutable profile fields of an existing one,
/// identified by their external chat id. Idempotent: calling twice with the same
/// `external_id` never creates a duplicate row.
pub async fn register(pool: &SqlitePool, params: RegisterParams) -> Result<User> {
    let now = now_str();
    let premium_expires_at = if params.is_premium.unwrap_or(false) {
        Some((Utc::now() + Duration::days(params.registration_premium_days)).to_rfc3339())
    } else {
        None
    };

    sqlx::query(
        r#"
        INSERT INTO users (external_id, language, country, safe_mode, view_mode, is_premium,
                            premium_expires_at, auto_notifications, email, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(external_id) DO UPDATE SET
            language = COALESCE(excluded.language, users.language),
            country = COALESCE(excluded.country, users.country),
            safe_mode = CASE WHEN ? THEN excluded.safe_mode ELSE users.safe_mode END,
            view_mode = CASE WHEN ? THEN excluded.view_mode ELSE users.view_mode END,
            is_premium = CASE WHEN ? THEN excluded.is_premium ELSE users.is_premium END,
            premium_expires_at = CASE WHEN ? THEN excluded.premium_expires_at ELSE users.premium_expires_at END,
            auto_notifications = CASE WHEN ? THEN excluded.auto_notifications ELSE users.auto_notifications END,
            email = COALESCE(excluded.email, users.email)
        "#,
    )
    .bind(&params.external_id)
    .bind(&params.language)
    .bind(&params.country)
    .bind(params.safe_mode.unwrap_or(false) as i64)
    .bind(params.view_mode.map(|v| v.to_string()).unwrap_or_else(|| "manual".to_string()))
    .bind(params.is_premium.unwrap_or(false) as i64)
    .bind(&premium_expires_at)
    .bind(params.auto_notifications.unwrap_or(false) as i64)
    .bind(&params.email)
    .bind(&now)
    .bind(params.safe_mode.is_some())
    .bind(params.view_mode.is_some())
    .bind(params.is_premium.is_some())
    .bind(params.is_premium.is_some())
    .bind(params.auto_notifications.is_some())
    .execute(pool)
    .await
    .context("register user")?;

    get_by_external_id(pool, &params.external_id).await
}

pub async fn get_by_external_id(pool: &SqlitePool, external_id: &str) -> Result<User> {
    let row: UserRow = sqlx::query_as(
        r#"SELECT id, external_id, language, country, safe_mode, view_mode, is_premium,
                  premium_expires_at, auto_notifications, email, current_feed_id, inviter_id,
                  level, badges_json, created_at
           FROM users WHERE external_id = ?"#,
    )
    .bind(external_id)
    .fetch_one(pool)
    .await
    .context("fetch user by external_id")?;

    row.into_model()
}

pub async fn get_by_id(pool: &SqlitePool, user_id: i64) -> Result<User> {
    let row: UserRow = sqlx::query_as(
        r#"SELECT id, external_id, language, country, safe_mode, view_mode, is_premium,
                  premium_expires_at, auto_notifications, email, current_feed_id, inviter_id,
                  level, badges_json, created_at
           FROM users WHERE id = ?"#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("fetch user by id")?;

    row.into_model()
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(
        r#"SELECT id, external_id, language, country, safe_mode, view_mode, is_premium,
                  premium_expires_at, auto_notifications, email, current_feed_id, inviter_id,
                  level, badges_json, created_at
           FROM users"#,
    )
    .fetch_all(pool)
    .await
    .context("list users")?;

    rows.into_iter().map(UserRow::into_model).collect()
}

pub async fn list_with_auto_notifications(pool: &SqlitePool) -> Result<Vec<User>> {
    let rows: Vec<UserRow> = sqlx::query_as(
        r#"SELECT id, external_id, language, country, safe_mode, view_mode, is_premium,
                  premium_expires_at, auto_notifications, email, current_feed_id, inviter_id,
                  level, badges_json, created_at
           FROM users WHERE auto_notifications = 1"#,
    )
    .fetch_all(pool)
    .await
    .context("list users with auto_notifications")?;

    rows.into_iter().map(UserRow::into_model).collect()
}

pub async fn set_current_feed(pool: &SqlitePool, user_id: i64, feed_id: Option<i64>) -> Result<()> {
    sqlx::query("UPDATE users SET current_feed_id = ? WHERE id = ?")
        .bind(feed_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("set current feed")?;
    Ok(())
}

pub async fn set_inviter_if_absent(pool: &SqlitePool, user_id: i64, inviter_id: i64) -> Result<()> {
    sqlx::query("UPDATE users SET inviter_id = ? WHERE id = ? AND inviter_id IS NULL")
        .bind(inviter_id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("set inviter")?;
    Ok(())
}

pub async fn grant_premium_days(pool: &SqlitePool, user_id: i64, days: i64) -> Result<()> {
    let expires = (Utc::now() + Duration::days(days)).to_rfc3339();
    sqlx::query(
        "UPDATE users SET is_premium = 1, premium_expires_at = ? WHERE id = ?",
    )
    .bind(expires)
    .bind(user_id)
    .execute(pool)
    .await
    .context("grant premium")?;
    Ok(())
}

pub async fn bump_level(pool: &SqlitePool, user_id: i64, delta: i64) -> Result<()> {
    sqlx::query("UPDATE users SET level = level + ? WHERE id = ?")
        .bind(delta)
        .bind(user_id)
        .execute(pool)
        .await
        .context("bump level")?;
    Ok(())
}
