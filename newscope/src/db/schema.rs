use anyhow::{Context, Result};
use sqlx::SqlitePool;

/// Idempotent schema bootstrap, in the spirit of the old `ensure_schema`: every statement is
/// `CREATE TABLE IF NOT EXISTS`, so calling this on an already-initialized database is a no-op.
/// No external `migrations/` directory is assumed at runtime.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            external_id TEXT NOT NULL UNIQUE,
            language TEXT,
            country TEXT,
            safe_mode INTEGER NOT NULL DEFAULT 0,
            view_mode TEXT NOT NULL DEFAULT 'manual',
            is_premium INTEGER NOT NULL DEFAULT 0,
            premium_expires_at TEXT,
            auto_notifications INTEGER NOT NULL DEFAULT 0,
            email TEXT UNIQUE,
            current_feed_id INTEGER,
            inviter_id INTEGER REFERENCES users(id),
            level INTEGER NOT NULL DEFAULT 1,
            badges_json TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create users table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS news_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            lang TEXT NOT NULL,
            country TEXT,
            source TEXT NOT NULL,
            link TEXT,
            media_type TEXT NOT NULL DEFAULT 'none',
            file_id TEXT,
            published_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            tone TEXT,
            sentiment_score REAL,
            is_fake INTEGER,
            is_duplicate INTEGER NOT NULL DEFAULT 0,
            moderation_status TEXT NOT NULL DEFAULT 'pending',
            source_type TEXT NOT NULL DEFAULT 'manual'
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create news_items table")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_news_items_published_at ON news_items(published_at DESC, id DESC);",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS news_tags (
            news_id INTEGER NOT NULL REFERENCES news_items(id),
            tag TEXT NOT NULL,
            PRIMARY KEY (news_id, tag)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create news_tags table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS news_topics (
            news_id INTEGER NOT NULL REFERENCES news_items(id),
            topic TEXT NOT NULL,
            PRIMARY KEY (news_id, topic)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create news_topics table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS filters (
            user_id INTEGER PRIMARY KEY REFERENCES users(id),
            tag TEXT,
            category TEXT,
            source TEXT,
            language TEXT,
            country TEXT,
            content_type TEXT
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create filters table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS custom_feeds (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            feed_name TEXT NOT NULL,
            filters_json TEXT NOT NULL DEFAULT '[]',
            UNIQUE(user_id, feed_name)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create custom_feeds table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS blocks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            block_type TEXT NOT NULL,
            value TEXT NOT NULL,
            UNIQUE(user_id, block_type, value)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create blocks table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            user_id INTEGER PRIMARY KEY REFERENCES users(id),
            active INTEGER NOT NULL DEFAULT 1,
            frequency TEXT NOT NULL DEFAULT 'daily',
            last_dispatched_at TEXT
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create subscriptions table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookmarks (
            user_id INTEGER NOT NULL REFERENCES users(id),
            news_id INTEGER NOT NULL REFERENCES news_items(id),
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (user_id, news_id)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create bookmarks table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            user_id INTEGER NOT NULL REFERENCES users(id),
            news_id INTEGER NOT NULL REFERENCES news_items(id),
            value INTEGER NOT NULL,
            PRIMARY KEY (user_id, news_id)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create ratings table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reactions (
            user_id INTEGER NOT NULL REFERENCES users(id),
            news_id INTEGER NOT NULL REFERENCES news_items(id),
            kind TEXT NOT NULL,
            PRIMARY KEY (user_id, news_id)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create reactions table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            news_id INTEGER NOT NULL REFERENCES news_items(id),
            user_id INTEGER NOT NULL REFERENCES users(id),
            parent_comment_id INTEGER REFERENCES comments(id),
            content TEXT NOT NULL,
            moderation_status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create comments table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS interactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            news_id INTEGER NOT NULL REFERENCES news_items(id),
            action TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create interactions table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_news_views (
            user_id INTEGER NOT NULL REFERENCES users(id),
            news_id INTEGER NOT NULL REFERENCES news_items(id),
            viewed INTEGER NOT NULL DEFAULT 0,
            first_viewed_at TEXT,
            last_viewed_at TEXT,
            read_full INTEGER NOT NULL DEFAULT 0,
            time_spent_seconds INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (user_id, news_id)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create user_news_views table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_stats (
            user_id INTEGER PRIMARY KEY REFERENCES users(id),
            viewed INTEGER NOT NULL DEFAULT 0,
            saved INTEGER NOT NULL DEFAULT 0,
            reported INTEGER NOT NULL DEFAULT 0,
            read_full_count INTEGER NOT NULL DEFAULT 0,
            skipped_count INTEGER NOT NULL DEFAULT 0,
            liked_count INTEGER NOT NULL DEFAULT 0,
            disliked_count INTEGER NOT NULL DEFAULT 0,
            comments_count INTEGER NOT NULL DEFAULT 0,
            sources_added_count INTEGER NOT NULL DEFAULT 0,
            last_active TEXT
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create user_stats table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sources (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            link TEXT NOT NULL,
            source_type TEXT NOT NULL DEFAULT 'manual',
            added_by_user INTEGER REFERENCES users(id),
            verified INTEGER NOT NULL DEFAULT 0,
            reliability_score REAL,
            status TEXT NOT NULL DEFAULT 'active',
            UNIQUE(name, link)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create sources table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS invites (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            inviter_user_id INTEGER NOT NULL REFERENCES users(id),
            invite_code TEXT NOT NULL UNIQUE,
            invited_user_id INTEGER REFERENCES users(id),
            accepted_at TEXT
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create invites table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS archived_news (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            original_news_id INTEGER NOT NULL UNIQUE,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            source TEXT NOT NULL,
            published_at TEXT NOT NULL,
            archived_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create archived_news table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admin_actions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            actor_user_id INTEGER NOT NULL REFERENCES users(id),
            action TEXT NOT NULL,
            target_table TEXT NOT NULL,
            target_id INTEGER NOT NULL,
            details_json TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create admin_actions table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            news_id INTEGER REFERENCES news_items(id),
            reason TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create reports table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS enrichment_jobs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            news_id INTEGER NOT NULL REFERENCES news_items(id),
            operation TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            attempts INTEGER NOT NULL DEFAULT 0,
            last_error TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            completed_at TEXT,
            UNIQUE(news_id, operation)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create enrichment_jobs table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS summary_cache (
            news_id INTEGER PRIMARY KEY REFERENCES news_items(id),
            summary TEXT NOT NULL,
            model TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create summary_cache table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS translation_cache (
            text_hash TEXT NOT NULL,
            source_lang TEXT NOT NULL DEFAULT '',
            target_lang TEXT NOT NULL,
            translated TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (text_hash, source_lang, target_lang)
        );
        "#,
    )
    .execute(pool)
    .await
    .context("create translation_cache table")?;

    Ok(())
}
