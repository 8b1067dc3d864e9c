//! Scheduler (C6): three cooperative background tasks, each a `tokio::select!` loop against
//! its own interval timer and the shared shutdown signal - the same shape as the ingestion
//! worker's drain loop.

use std::sync::Arc;

use chrono::{Timelike, Utc};
use common::Config;
use sqlx::SqlitePool;
use tokio::sync::Notify;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

use crate::db;
use crate::dispatch::ChatDispatcher;
use crate::feed_resolver::{self, ResolveParams};
use crate::models::Frequency;

/// Dispatches digests to "hourly" subscribers every tick, and to "daily" subscribers once
/// a day at `config.scheduler.digest_daily_hour`.
pub async fn run_digest_dispatcher(
    pool: SqlitePool,
    config: Arc<Config>,
    dispatcher: Arc<dyn ChatDispatcher>,
    shutdown: Arc<Notify>,
) {
    let mut ticker = interval(Duration::from_secs(config.scheduler.digest_hourly_period_minutes * 60));
    let mut last_daily_dispatch_date = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                dispatch_to(&pool, &config, dispatcher.as_ref(), Frequency::Hourly).await;

                let now = Utc::now();
                if now.hour() == config.scheduler.digest_daily_hour
                    && last_daily_dispatch_date != Some(now.date_naive())
                {
                    dispatch_to(&pool, &config, dispatcher.as_ref(), Frequency::Daily).await;
                    last_daily_dispatch_date = Some(now.date_naive());
                }
            }
            _ = shutdown.notified() => {
                info!("digest dispatcher received shutdown signal");
                break;
            }
        }
    }
}

async fn dispatch_to(pool: &SqlitePool, config: &Config, dispatcher: &dyn ChatDispatcher, frequency: Frequency) {
    let subs = match db::subscriptions::active_by_frequency(pool, frequency).await {
        Ok(subs) => subs,
        Err(e) => {
            error!(error = %e, "failed to list active subscriptions");
            return;
        }
    };

    for sub in subs {
        let user = match db::users::get_by_id(pool, sub.user_id).await {
            Ok(user) => user,
            Err(e) => {
                error!(user_id = sub.user_id, error = %e, "failed to load user for dispatch");
                continue;
            }
        };

        let params = ResolveParams {
            limit: config.scheduler.digest_max_items,
            offset: 0,
            since: sub.last_dispatched_at,
        };
        let items = match feed_resolver::resolve(pool, config, &user, params).await {
            Ok(items) => items,
            Err(e) => {
                error!(user_id = user.id, error = %e, "failed to resolve feed for dispatch");
                continue;
            }
        };

        if items.is_empty() {
            continue;
        }

        for item in &items {
            if let Err(e) = mark_viewed(pool, user.id, item.id).await {
                error!(user_id = user.id, news_id = item.id, error = %e, "failed to mark item viewed before dispatch");
            }
        }

        if let Err(e) = dispatcher.send_digest(&user.external_id, &items).await {
            warn!(user_id = user.id, error = %e, "digest dispatch failed");
            continue;
        }

        if let Err(e) = db::subscriptions::mark_dispatched(pool, user.id).await {
            error!(user_id = user.id, error = %e, "failed to record dispatch timestamp");
        }
    }
}

/// Marks an item viewed for a user ahead of a scheduled send, in its own transaction - the
/// same `user_news_views` upsert the Interaction Recorder uses for an explicit view action,
/// so a dispatched/notified item never reappears in a later resolution for that user.
async fn mark_viewed(pool: &SqlitePool, user_id: i64, news_id: i64) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    db::interactions::mark_viewed(&mut tx, user_id, news_id, false).await?;
    tx.commit().await?;
    Ok(())
}

/// Pushes a single-item alert to users with `auto_notifications` enabled, for items newly
/// visible to them since their last check. Runs on a shorter interval than the digest loop.
pub async fn run_auto_notifier(
    pool: SqlitePool,
    config: Arc<Config>,
    dispatcher: Arc<dyn ChatDispatcher>,
    shutdown: Arc<Notify>,
) {
    let mut ticker = interval(Duration::from_secs(config.scheduler.notify_period_minutes * 60));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let users = match db::users::list_with_auto_notifications(&pool).await {
                    Ok(users) => users,
                    Err(e) => {
                        error!(error = %e, "failed to list auto-notification users");
                        continue;
                    }
                };

                for user in users {
                    let params = ResolveParams { limit: 1, offset: 0, since: None };
                    let items = match feed_resolver::resolve(&pool, &config, &user, params).await {
                        Ok(items) => items,
                        Err(e) => {
                            error!(user_id = user.id, error = %e, "failed to resolve feed for notification");
                            continue;
                        }
                    };
                    if let Some(item) = items.into_iter().next() {
                        if let Err(e) = mark_viewed(&pool, user.id, item.id).await {
                            error!(user_id = user.id, news_id = item.id, error = %e, "failed to mark item viewed before notification");
                        }
                        if let Err(e) = dispatcher.send_single(&user.external_id, &item).await {
                            warn!(user_id = user.id, error = %e, "auto-notification dispatch failed");
                        }
                    }
                }
            }
            _ = shutdown.notified() => {
                info!("auto-notifier received shutdown signal");
                break;
            }
        }
    }
}

/// Archives and removes expired news items not held by any bookmark.
pub async fn run_cleanup_sweep(pool: SqlitePool, config: Arc<Config>, shutdown: Arc<Notify>) {
    let mut ticker = interval(Duration::from_secs(config.scheduler.cleanup_period_minutes * 60));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let ids = match db::news::expired_ids(&pool).await {
                    Ok(ids) => ids,
                    Err(e) => {
                        error!(error = %e, "failed to list expired news ids");
                        continue;
                    }
                };

                for news_id in ids {
                    let item = match db::news::get(&pool, news_id).await {
                        Ok(item) => item,
                        Err(e) => {
                            error!(news_id, error = %e, "failed to load expired news item");
                            continue;
                        }
                    };
                    if let Err(e) = db::archive::archive(&pool, &item).await {
                        error!(news_id, error = %e, "failed to archive expired news item");
                        continue;
                    }
                    match db::news::delete_if_not_bookmarked(&pool, news_id).await {
                        Ok(deleted) => {
                            if !deleted {
                                info!(news_id, "expired item kept: still bookmarked");
                            }
                        }
                        Err(e) => error!(news_id, error = %e, "failed to delete expired news item"),
                    }
                }
            }
            _ = shutdown.notified() => {
                info!("cleanup sweep received shutdown signal");
                break;
            }
        }
    }
}
