//! Integration coverage for the resolver's testable properties: exactly-once visibility,
//! freshness, block-dominates-filter and the safe-mode subset relation.

use chrono::{Duration, Utc};
use common::{
    AdminConfig, ChatFrontendConfig, Config, DatabaseConfig, EnrichmentConfig, IngestionConfig,
    PremiumConfig, SafeModeConfig, SchedulerConfig, TrendingConfig,
};
use newscope::db;
use newscope::db::news::NewSubmission;
use newscope::feed_resolver::{self, ResolveParams};
use newscope::models::{BlockType, MediaType, ModerationStatus, SourceType};
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
        premium: PremiumConfig::default(),
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

async fn insert_approved_item(pool: &SqlitePool, title: &str, source: &str, tags: &[&str]) -> i64 {
    db::news::insert(
        pool,
        NewSubmission {
            title: title.to_string(),
            content: format!("content for {title}"),
            lang: "en".to_string(),
            country: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            source: source.to_string(),
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
async fn viewed_items_never_reappear_in_resolution() {
    let pool = test_pool().await;
    let config = test_config();
    let user_id = insert_user(&pool, "alice").await;
    let news_id = insert_approved_item(&pool, "first", "reuters", &[]).await;

    let user = db::users::get_by_id(&pool, user_id).await.unwrap();
    let before = feed_resolver::resolve(&pool, &config, &user, ResolveParams::default()).await.unwrap();
    assert_eq!(before.len(), 1);

    let mut tx = pool.begin().await.unwrap();
    db::interactions::mark_viewed(&mut tx, user_id, news_id, false).await.unwrap();
    tx.commit().await.unwrap();

    let after = feed_resolver::resolve(&pool, &config, &user, ResolveParams::default()).await.unwrap();
    assert!(after.is_empty(), "an item marked viewed must not reappear in resolution");
}

#[tokio::test]
async fn expired_items_are_excluded_from_resolution() {
    let pool = test_pool().await;
    let config = test_config();
    let user_id = insert_user(&pool, "bob").await;

    db::news::insert(
        &pool,
        NewSubmission {
            title: "stale".to_string(),
            content: "old news".to_string(),
            lang: "en".to_string(),
            country: None,
            tags: vec![],
            source: "ap".to_string(),
            link: None,
            file_id: None,
            media_type: MediaType::None,
            published_at: Utc::now() - Duration::days(2),
            expires_at: Utc::now() - Duration::hours(1),
            source_type: SourceType::Manual,
            moderation_status: ModerationStatus::Approved,
        },
    )
    .await
    .unwrap();

    let user = db::users::get_by_id(&pool, user_id).await.unwrap();
    let items = feed_resolver::resolve(&pool, &config, &user, ResolveParams::default()).await.unwrap();
    assert!(items.is_empty(), "expired items must never be resolved");
}

#[tokio::test]
async fn blocking_a_source_overrides_a_filter_that_would_include_it() {
    let pool = test_pool().await;
    let config = test_config();
    let user_id = insert_user(&pool, "carol").await;

    db::filters::update(
        &pool,
        user_id,
        newscope::models::Filter {
            tag: None,
            category: None,
            source: Some("reuters".to_string()),
            language: None,
            country: None,
            content_type: None,
        },
    )
    .await
    .unwrap();
    insert_approved_item(&pool, "matches filter", "reuters", &[]).await;

    db::blocks::add(&pool, user_id, BlockType::Source, "reuters").await.unwrap();

    let user = db::users::get_by_id(&pool, user_id).await.unwrap();
    let items = feed_resolver::resolve(&pool, &config, &user, ResolveParams::default()).await.unwrap();
    assert!(items.is_empty(), "a blocked source must be excluded even though the filter selects it");
}

#[tokio::test]
async fn safe_mode_subtracts_negative_tone_items_from_the_unfiltered_set() {
    let pool = test_pool().await;
    let config = test_config();
    let user_id = insert_user(&pool, "dave").await;

    let calm_id = insert_approved_item(&pool, "calm story", "bbc", &[]).await;
    let upsetting_id = insert_approved_item(&pool, "upsetting story", "bbc", &[]).await;
    db::news::apply_sentiment(&pool, upsetting_id, newscope::models::Tone::Negative, -0.8).await.unwrap();

    let mut user = db::users::get_by_id(&pool, user_id).await.unwrap();
    let unfiltered = feed_resolver::resolve(&pool, &config, &user, ResolveParams::default()).await.unwrap();
    let unfiltered_ids: Vec<i64> = unfiltered.iter().map(|i| i.id).collect();
    assert!(unfiltered_ids.contains(&calm_id));
    assert!(unfiltered_ids.contains(&upsetting_id));

    user.safe_mode = true;
    let filtered = feed_resolver::resolve(&pool, &config, &user, ResolveParams::default()).await.unwrap();
    let filtered_ids: Vec<i64> = filtered.iter().map(|i| i.id).collect();
    assert!(filtered_ids.contains(&calm_id));
    assert!(
        !filtered_ids.contains(&upsetting_id),
        "safe mode must subtract negative-tone items from the unfiltered resolution set"
    );
    assert!(
        filtered_ids.iter().all(|id| unfiltered_ids.contains(id)),
        "safe mode output must be a subset of the unfiltered output"
    );
}
