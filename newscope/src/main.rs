//! newscope - single-binary main.rs
//! Starts the Rocket HTTP server and the background scheduler/ingestion tasks inside the
//! same process, the way the original worker + server split was collapsed here.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use common::{init_db_pool, Config};
use tokio::sync::Notify;
use tokio::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newscope::db;
use newscope::dispatch::{ChatDispatcher, HttpChatDispatcher, NullChatDispatcher};
use newscope::enrichment::remote::RemoteEnrichmentProvider;
use newscope::enrichment::stub::StubEnrichmentProvider;
use newscope::enrichment::EnrichmentProvider;
use newscope::http;
use newscope::ingestion::{self, IngestionHandle};
use newscope::scheduler;

#[derive(Parser, Debug)]
#[command(name = "newscope", about = "Newscope single-binary server + worker")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Disable background worker (ingestion + scheduler) tasks, run the HTTP server only
    #[arg(long)]
    no_worker: bool,

    /// Run worker tasks only, do not bind the HTTP server
    #[arg(long)]
    worker_only: bool,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn build_enrichment_provider(config: &Config) -> Arc<dyn EnrichmentProvider> {
    match config.enrichment.provider.as_str() {
        "remote" => match &config.enrichment.remote {
            Some(remote_cfg) => {
                let api_key = remote_cfg
                    .api_key_env
                    .as_deref()
                    .and_then(|env_var| std::env::var(env_var).ok());
                match (api_key, &remote_cfg.api_url) {
                    (Some(api_key), Some(api_url)) => {
                        let model = remote_cfg.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string());
                        info!(model = %model, api_url = %api_url, "remote enrichment provider initialized");
                        Arc::new(RemoteEnrichmentProvider::new(
                            api_url.clone(),
                            api_key,
                            model,
                            remote_cfg.timeout_seconds.unwrap_or(30),
                        ))
                    }
                    _ => {
                        error!("enrichment.provider = \"remote\" but api_url or api_key_env is missing; falling back to stub");
                        Arc::new(StubEnrichmentProvider)
                    }
                }
            }
            None => {
                error!("enrichment.provider = \"remote\" but no [enrichment.remote] section configured; falling back to stub");
                Arc::new(StubEnrichmentProvider)
            }
        },
        _ => Arc::new(StubEnrichmentProvider),
    }
}

fn build_dispatcher(config: &Config) -> Arc<dyn ChatDispatcher> {
    match &config.chat_frontend.base_url {
        Some(base_url) => Arc::new(HttpChatDispatcher::new(base_url.clone(), config.chat_frontend.timeout_seconds)),
        None => Arc::new(NullChatDispatcher),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let default_path = PathBuf::from("config.default.toml");
    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    let config = Config::load_with_defaults(
        if default_path.exists() { Some(&default_path) } else { None },
        override_path.as_deref(),
    )
    .await?;
    info!(default = ?default_path, override = ?override_path, "configuration loaded");

    let db_path_abs = tokio::fs::canonicalize(&config.database.path)
        .await
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| config.database.path.clone());
    info!(db_path = %db_path_abs, "resolved DB path");

    let db_pool = init_db_pool(&db_path_abs).await?;
    db::schema::ensure_schema(&db_pool).await?;

    let config = Arc::new(config);
    let shutdown_notify = Arc::new(Notify::new());
    let provider = build_enrichment_provider(&config);
    let dispatcher = build_dispatcher(&config);
    let (ingestion_handle, ingestion_rx) = IngestionHandle::new(config.ingestion.queue_capacity);

    let worker_handles = if !args.no_worker {
        info!("spawning ingestion worker and scheduler tasks");
        let ingestion_task = tokio::spawn(ingestion::run_worker(
            db_pool.clone(),
            config.clone(),
            provider.clone(),
            ingestion_rx,
            shutdown_notify.clone(),
        ));
        let digest_task = tokio::spawn(scheduler::run_digest_dispatcher(
            db_pool.clone(),
            config.clone(),
            dispatcher.clone(),
            shutdown_notify.clone(),
        ));
        let notifier_task = tokio::spawn(scheduler::run_auto_notifier(
            db_pool.clone(),
            config.clone(),
            dispatcher.clone(),
            shutdown_notify.clone(),
        ));
        let cleanup_task = tokio::spawn(scheduler::run_cleanup_sweep(
            db_pool.clone(),
            config.clone(),
            shutdown_notify.clone(),
        ));
        Some((ingestion_task, digest_task, notifier_task, cleanup_task))
    } else {
        info!("background worker tasks disabled via --no-worker");
        drop(ingestion_rx);
        None
    };

    if args.worker_only {
        info!("running in worker-only mode, waiting for ctrl-c");
        tokio::signal::ctrl_c().await?;
        info!("ctrl-c received, notifying worker tasks to shut down");
        shutdown_notify.notify_waiters();
        if let Some((a, b, c, d)) = worker_handles {
            let _ = tokio::time::timeout(Duration::from_secs(20), async { tokio::join!(a, b, c, d) }).await;
        }
        info!("worker-only run finished");
        return Ok(());
    }

    info!("launching Rocket HTTP server");
    if let Err(e) = http::launch_rocket(db_pool, config, ingestion_handle, dispatcher, provider).await {
        error!(%e, "Rocket server failed");
    }

    info!("HTTP server stopped; notifying worker tasks to shut down");
    shutdown_notify.notify_waiters();
    if let Some((a, b, c, d)) = worker_handles {
        match tokio::time::timeout(Duration::from_secs(20), async { tokio::join!(a, b, c, d) }).await {
            Ok(_) => info!("worker tasks exited cleanly"),
            Err(_) => info!("timed out waiting for worker tasks to exit; continuing shutdown"),
        }
    }

    info!("shutdown complete");
    Ok(())
}
