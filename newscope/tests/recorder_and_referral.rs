//! Integration coverage for counter monotonicity, the rating domain invariant and invite
//! atomicity, exercised through the public `recorder`/`referral` APIs rather than the raw
//! `db::*` functions they compose.

use chrono::{Duration, Utc};
use common::{
    AdminConfig, ChatFrontendConfig, Config, DatabaseConfig, EnrichmentConfig, IngestionConfig,
    PremiumConfig, SafeModeConfig, SchedulerConfig, TrendingConfig,
};
use newscope::db;
use newscope::db::news::NewSubmission;
use newscope::error::AppError;
use newscope::models::{InteractionAction, MediaType, ModerationStatus, SourceType};
use newscope::recorder;
use newscope::referral;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new().connect("sqlite::memory:").await.unwrap();
    db::schema::ensure_schema(&pool).await.unwrap();
    pool
}

fn test_config() -> Config {
    Config {
        database: DatabaseConfig { path: "test.db".to_string() },
        scheduler: SchedulerConfig::default(),
        ingestion: IngestionConfig::default(),
        safe_mode: SafeModeConfig::default(),
        trending: TrendingConfig::default(),
        premium: PremiumConfig {
            invite_premium_days: 7,
            registration_premium_days: 0,
        },
        chat_frontend: ChatFrontendConfig::default(),
        enrichment: EnrichmentConfig::default(),
        admin: None::<AdminConfig>,
    }
}

async fn insert_user(pool: &SqlitePool, external_id: &str) -> i64 {
    db::users::register(
        pool,
        db::users::RegisterParams {
            external_id: external_id.to_string(),
            language: None,
            country: None,
            safe_mode: Some(false),
            is_premium: None,
            auto_notifications: None,
            email: None,
            view_mode: None,
            registration_premium_days: 0,
        },
    )
    .await
    .unwrap()
    .id
}

async fn insert_news(pool: &SqlitePool) -> i64 {
    db::news::insert(
        pool,
        NewSubmission {
            title: "item".to_string(),
            content: "body".to_string(),
            lang: "en".to_string(),
            country: None,
            tags: vec![],
            source: "reuters".to_string(),
            link: None,
            file_id: None,
            media_type: MediaType::None,
            published_at: Utc::now(),
            expires_at: Utc::now() + Duration::hours(24),
            source_type: SourceType::Manual,
            moderation_status: ModerationStatus::Approved,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn recording_a_view_then_a_like_monotonically_increases_both_counters() {
    let pool = test_pool().await;
    let user_id = insert_user(&pool, "erin").await;
    let news_id = insert_news(&pool).await;

    recorder::record_interaction(&pool, user_id, news_id, InteractionAction::View, false).await.unwrap();
    let after_view = db::stats::get(&pool, user_id).await.unwrap();
    assert_eq!(after_view.viewed, 1);
    assert_eq!(after_view.liked_count, 0);

    recorder::record_interaction(&pool, user_id, news_id, InteractionAction::Like, false).await.unwrap();
    let after_like = db::stats::get(&pool, user_id).await.unwrap();
    assert_eq!(after_like.viewed, 1, "a later, different action must not retroactively change the view counter");
    assert_eq!(after_like.liked_count, 1);
}

#[tokio::test]
async fn rating_outside_one_to_five_is_rejected_before_any_write() {
    let pool = test_pool().await;
    let user_id = insert_user(&pool, "frank").await;
    let news_id = insert_news(&pool).await;

    let err = recorder::rate(&pool, user_id, news_id, 0).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = recorder::rate(&pool, user_id, news_id, 6).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    recorder::rate(&pool, user_id, news_id, 5).await.unwrap();
    let avg = db::ratings::average_since(&pool, news_id, &Utc::now().to_rfc3339()).await.unwrap();
    assert_eq!(avg, Some(5.0));
}

#[tokio::test]
async fn an_invite_code_grants_premium_exactly_once_even_if_accepted_concurrently() {
    let pool = test_pool().await;
    let config = test_config();
    let inviter_id = insert_user(&pool, "grace").await;
    let first_invitee = insert_user(&pool, "henry").await;
    let second_invitee = insert_user(&pool, "iris").await;

    let code = referral::generate_invite(&pool, inviter_id).await.unwrap();

    referral::accept_invite(&pool, &config, first_invitee, &code).await.unwrap();
    let invitee = db::users::get_by_id(&pool, first_invitee).await.unwrap();
    assert!(invitee.effective_is_premium(Utc::now()));

    let err = referral::accept_invite(&pool, &config, second_invitee, &code).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "a second acceptance of the same code must be rejected");

    let second = db::users::get_by_id(&pool, second_invitee).await.unwrap();
    assert!(!second.effective_is_premium(Utc::now()), "a rejected acceptance must not grant premium");
}
