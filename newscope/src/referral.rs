//! Referral Program (C8): invite generation and acceptance. Grants are premium-days, not
//! arbitrary credits, and the first accepted invite wins - a user's `inviter_id` is set at
//! most once.

use anyhow::Result;
use common::Config;
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;

pub async fn generate_invite(pool: &SqlitePool, inviter_user_id: i64) -> Result<String, AppError> {
    db::invites::generate(pool, inviter_user_id).await.map_err(AppError::Internal)
}

/// Accepts an invite on behalf of `invited_user_id`. Rejects self-referral and double
/// acceptance; grants the invitee premium days and bumps the inviter's level only on a
/// genuinely new claim.
pub async fn accept_invite(pool: &SqlitePool, config: &Config, invited_user_id: i64, code: &str) -> Result<(), AppError> {
    let invite = db::invites::get_by_code(pool, code)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found("invite code not found"))?;

    if invite.inviter_user_id == invited_user_id {
        return Err(AppError::validation("cannot accept your own invite"));
    }

    let claimed = db::invites::try_accept(pool, invite.id, invited_user_id)
        .await
        .map_err(AppError::Internal)?;
    if !claimed {
        return Err(AppError::conflict("invite already accepted"));
    }

    db::users::set_inviter_if_absent(pool, invited_user_id, invite.inviter_user_id)
        .await
        .map_err(AppError::Internal)?;
    db::users::grant_premium_days(pool, invited_user_id, config.premium.invite_premium_days)
        .await
        .map_err(AppError::Internal)?;
    db::users::bump_level(pool, invite.inviter_user_id, 1)
        .await
        .map_err(AppError::Internal)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new().connect("sqlite::memory:").await.unwrap();
        db::schema::ensure_schema(&pool).await.unwrap();
        for (id, ext) in [(1, "inviter"), (2, "invitee")] {
            sqlx::query("INSERT INTO users (id, external_id, created_at) VALUES (?, ?, '2024-01-01T00:00:00Z')")
                .bind(id)
                .bind(ext)
                .execute(&pool)
                .await
                .unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn accept_invite_rejects_self_referral() {
        let pool = test_pool().await;
        let config = Config {
            database: common::DatabaseConfig { path: "test.db".to_string() },
            scheduler: Default::default(),
            ingestion: Default::default(),
            safe_mode: Default::default(),
            trending: Default::default(),
            premium: Default::default(),
            chat_frontend: Default::default(),
            enrichment: Default::default(),
            admin: None,
        };
        let code = generate_invite(&pool, 1).await.unwrap();
        let err = accept_invite(&pool, &config, 1, &code).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn accept_invite_rejects_second_claim() {
        let pool = test_pool().await;
        let config = Config {
            database: common::DatabaseConfig { path: "test.db".to_string() },
            scheduler: Default::default(),
            ingestion: Default::default(),
            safe_mode: Default::default(),
            trending: Default::default(),
            premium: Default::default(),
            chat_frontend: Default::default(),
            enrichment: Default::default(),
            admin: None,
        };
        let code = generate_invite(&pool, 1).await.unwrap();
        accept_invite(&pool, &config, 2, &code).await.unwrap();

        sqlx::query("INSERT INTO users (id, external_id, created_at) VALUES (3, 'third', '2024-01-01T00:00:00Z')")
            .execute(&pool)
            .await
            .unwrap();
        let err = accept_invite(&pool, &config, 3, &code).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
