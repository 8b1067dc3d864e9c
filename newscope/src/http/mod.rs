//! The HTTP surface the chat front-end talks to. Route handlers are thin: validation and
//! orchestration live in the modules under `crate::{db, recorder, discovery, referral,
//! moderation}`; handlers just unwrap the request body, call through, and wrap the response.

pub mod admin;
pub mod bookmarks;
pub mod comments;
pub mod custom_feeds;
pub mod discovery;
pub mod enrichment;
pub mod filters;
pub mod invites;
pub mod interactions;
pub mod news;
pub mod sources;
pub mod state;
pub mod subscriptions;
pub mod users;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use common::Config;
use rocket::serde::json::Json;
use rocket::{get, routes, State};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::dispatch::ChatDispatcher;
use crate::enrichment::EnrichmentProvider;
use crate::error::AppError;
use crate::ingestion::IngestionHandle;

use state::AppState;

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    users_count: i64,
    scheduler: StatusSchedulerConfig,
}

#[derive(Serialize)]
struct StatusSchedulerConfig {
    digest_hourly_period_minutes: u64,
    digest_daily_hour: u32,
    notify_period_minutes: u64,
    cleanup_period_minutes: u64,
}

/// Kept from the teacher's own `/api/v1/status` idiom: uptime plus a glance at the
/// configuration actually driving the background tasks.
#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    let uptime_seconds = (Utc::now() - state.started_at).num_seconds();
    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await?;

    Ok(Json(StatusResponse {
        status: "ok",
        uptime_seconds,
        users_count,
        scheduler: StatusSchedulerConfig {
            digest_hourly_period_minutes: state.config.scheduler.digest_hourly_period_minutes,
            digest_daily_hour: state.config.scheduler.digest_daily_hour,
            notify_period_minutes: state.config.scheduler.notify_period_minutes,
            cleanup_period_minutes: state.config.scheduler.cleanup_period_minutes,
        },
    }))
}

/// Builds the managed state and launches Rocket. Runs until shutdown (SIGINT/SIGTERM); the
/// worker tasks are started and stopped independently by the caller.
pub async fn launch_rocket(
    db: SqlitePool,
    config: Arc<Config>,
    ingestion: IngestionHandle,
    dispatcher: Arc<dyn ChatDispatcher>,
    provider: Arc<dyn EnrichmentProvider>,
) -> Result<()> {
    let state = AppState {
        started_at: Utc::now(),
        db,
        config,
        ingestion,
        dispatcher,
        provider,
    };

    // Pick up [server].bind/port from a config file on disk, the way the rest of the
    // deployment expects - failure to find or parse one is non-fatal, Rocket's own
    // defaults apply.
    let mut fig = rocket::Config::figment();
    let cfg_path_env = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "/config/config.toml".to_string());
    let cfg_path = if std::path::Path::new(&cfg_path_env).exists() {
        cfg_path_env
    } else if std::path::Path::new("config.toml").exists() {
        "config.toml".to_string()
    } else {
        String::new()
    };

    if !cfg_path.is_empty() {
        if let Ok(cfg_contents) = std::fs::read_to_string(&cfg_path) {
            if let Ok(toml_val) = toml::from_str::<toml::Value>(&cfg_contents) {
                if let Some(server_val) = toml_val.get("server") {
                    if let Some(bind) = server_val.get("bind").and_then(|v| v.as_str()) {
                        fig = fig.merge(("address", bind.to_string()));
                    }
                    if let Some(port) = server_val.get("port").and_then(|v| v.as_integer()) {
                        fig = fig.merge(("port", port as u16));
                    }
                }
            }
        }
    }

    let rocket = rocket::custom(fig).manage(state).mount(
        "/",
        routes![
            health,
            status,
            users::register,
            users::profile,
            news::add,
            news::list,
            news::search,
            filters::update,
            filters::get,
            filters::reset,
            custom_feeds::create,
            custom_feeds::list,
            custom_feeds::switch,
            subscriptions::update,
            subscriptions::unsubscribe,
            bookmarks::add,
            bookmarks::list,
            comments::add,
            comments::list,
            interactions::rate,
            interactions::block,
            interactions::report,
            interactions::log_user_activity,
            enrichment::summary,
            enrichment::verify,
            enrichment::rewrite_headline,
            enrichment::translate,
            discovery::recommend,
            discovery::trending,
            discovery::analytics,
            invites::generate,
            invites::accept,
            sources::add,
            admin::moderate,
        ],
    );

    tracing::info!("starting Rocket HTTP server");
    rocket.launch().await.map_err(|e| anyhow!("Rocket failed: {}", e))?;
    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}
