//! Feed Resolver: composes a user's active custom feed or base filter, blocklist, safe mode
//! and seen-set into one parameterized query. Nothing here fetches broad candidates and
//! filters in memory - every predicate is pushed into the SQL.

use anyhow::{Context, Result};
use common::Config;
use sqlx::sqlite::Sqlite;
use sqlx::{QueryBuilder, SqlitePool};

use crate::db::news::hydrate_many;
use crate::models::{CustomFeed, Filter, FilterKind, NewsItem};
use crate::{db, models::User};

pub struct ResolveParams {
    pub limit: i64,
    pub offset: i64,
    /// Only items published on/after this instant, if set (scheduler dispatch windows).
    pub since: Option<chrono::DateTime<chrono::Utc>>,
}

impl Default for ResolveParams {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            since: None,
        }
    }
}

pub async fn resolve(pool: &SqlitePool, config: &Config, user: &User, params: ResolveParams) -> Result<Vec<NewsItem>> {
    let active_feed = match user.current_feed_id {
        Some(feed_id) => db::custom_feeds::get_owned(pool, feed_id, user.id).await?,
        None => None,
    };

    let blocks = db::blocks::list_for_user(pool, user.id).await?;

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"SELECT DISTINCT n.id, n.title, n.content, n.lang, n.country, n.source, n.link,
                  n.media_type, n.file_id, n.published_at, n.expires_at, n.tone,
                  n.sentiment_score, n.is_fake, n.is_duplicate, n.moderation_status, n.source_type
           FROM news_items n
           WHERE n.expires_at > "#,
    );
    qb.push_bind(chrono::Utc::now().to_rfc3339());
    qb.push(" AND n.is_duplicate = 0 AND n.moderation_status = 'approved'");

    if let Some(since) = params.since {
        qb.push(" AND n.published_at >= ");
        qb.push_bind(since.to_rfc3339());
    }

    // Step 2: positive filter - active custom feed if set, else the base Filter row.
    match &active_feed {
        Some(feed) => push_custom_feed_clause(&mut qb, feed),
        None => {
            let filter = db::filters::get(pool, user.id).await?;
            push_base_filter_clause(&mut qb, &filter);
        }
    }

    // Step 3: blocklist subtraction.
    for block in &blocks {
        let column = match block.block_type {
            crate::models::BlockType::Source => Some("n.source"),
            crate::models::BlockType::Language => Some("n.lang"),
            crate::models::BlockType::Tag | crate::models::BlockType::Category => None,
        };
        match column {
            Some(column) => {
                qb.push(format!(" AND {} <> ", column));
                qb.push_bind(block.value.clone());
            }
            None => {
                qb.push(
                    " AND n.id NOT IN (SELECT news_id FROM news_tags WHERE tag = ",
                );
                qb.push_bind(block.value.clone());
                qb.push(" UNION SELECT news_id FROM news_topics WHERE topic = ");
                qb.push_bind(block.value.clone());
                qb.push(")");
            }
        }
    }

    // Step 4: safe mode.
    if user.safe_mode {
        qb.push(" AND (n.tone IS NULL OR n.tone NOT IN ('negative', 'anxious'))");
        if !config.safe_mode.nsfw_tags.is_empty() {
            qb.push(" AND n.id NOT IN (SELECT news_id FROM news_tags WHERE tag IN (");
            let mut sep = qb.separated(", ");
            for tag in &config.safe_mode.nsfw_tags {
                sep.push_bind(tag.clone());
            }
            qb.push(") UNION SELECT news_id FROM news_topics WHERE topic IN (");
            let mut sep2 = qb.separated(", ");
            for tag in &config.safe_mode.nsfw_tags {
                sep2.push_bind(tag.clone());
            }
            qb.push("))");
        }
    }

    // Step 5: seen-set subtraction.
    qb.push(
        " AND n.id NOT IN (SELECT news_id FROM user_news_views WHERE user_id = ",
    );
    qb.push_bind(user.id);
    qb.push(" AND viewed = 1)");

    // Step 6 + 7: deterministic order, pagination.
    qb.push(" ORDER BY n.published_at DESC, n.id DESC LIMIT ");
    qb.push_bind(params.limit);
    qb.push(" OFFSET ");
    qb.push_bind(params.offset);

    let rows = qb
        .build_query_as::<db::news::NewsRow>()
        .fetch_all(pool)
        .await
        .context("resolve feed query")?;

    hydrate_many(pool, rows).await
}

fn push_base_filter_clause(qb: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) {
    if let Some(tag) = &filter.tag {
        qb.push(" AND n.id IN (SELECT news_id FROM news_tags WHERE tag = ");
        qb.push_bind(tag.clone());
        qb.push(" UNION SELECT news_id FROM news_topics WHERE topic = ");
        qb.push_bind(tag.clone());
        qb.push(")");
    }
    if let Some(category) = &filter.category {
        qb.push(" AND n.id IN (SELECT news_id FROM news_tags WHERE tag = ");
        qb.push_bind(category.clone());
        qb.push(" UNION SELECT news_id FROM news_topics WHERE topic = ");
        qb.push_bind(category.clone());
        qb.push(")");
    }
    if let Some(source) = &filter.source {
        qb.push(" AND n.source = ");
        qb.push_bind(source.clone());
    }
    if let Some(language) = &filter.language {
        qb.push(" AND n.lang = ");
        qb.push_bind(language.clone());
    }
    if let Some(country) = &filter.country {
        qb.push(" AND n.country = ");
        qb.push_bind(country.clone());
    }
    if let Some(content_type) = &filter.content_type {
        qb.push(" AND n.media_type = ");
        qb.push_bind(content_type.clone());
    }
}

fn push_custom_feed_clause(qb: &mut QueryBuilder<'_, Sqlite>, feed: &CustomFeed) {
    for clause in &feed.filters {
        if clause.values.is_empty() {
            continue;
        }
        match clause.kind {
            FilterKind::Tags => {
                qb.push(" AND n.id IN (SELECT news_id FROM news_tags WHERE tag IN (");
                push_in_list(qb, &clause.values);
                qb.push(") UNION SELECT news_id FROM news_topics WHERE topic IN (");
                push_in_list(qb, &clause.values);
                qb.push("))");
            }
            FilterKind::Sources => {
                qb.push(" AND n.source IN (");
                push_in_list(qb, &clause.values);
                qb.push(")");
            }
            FilterKind::Languages => {
                qb.push(" AND n.lang IN (");
                push_in_list(qb, &clause.values);
                qb.push(")");
            }
            FilterKind::Countries => {
                qb.push(" AND n.country IN (");
                push_in_list(qb, &clause.values);
                qb.push(")");
            }
            FilterKind::ContentTypes => {
                qb.push(" AND n.media_type IN (");
                push_in_list(qb, &clause.values);
                qb.push(")");
            }
        }
    }
}

fn push_in_list(qb: &mut QueryBuilder<'_, Sqlite>, values: &[String]) {
    let mut sep = qb.separated(", ");
    for v in values {
        sep.push_bind(v.clone());
    }
}
