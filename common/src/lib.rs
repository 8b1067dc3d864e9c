/*!
common/src/lib.rs

Shared configuration types and DB helper functions for Newscope.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader for a TOML config file
- Helpers to initialize an SQLite database pool
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Database configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the sqlite database file (e.g. "data/newscope.db")
    pub path: String,
}

/// Subscription scheduler timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Period, in minutes, between digest dispatcher runs for "hourly" subscribers.
    #[serde(default = "SchedulerConfig::default_digest_hourly_period_minutes")]
    pub digest_hourly_period_minutes: u64,
    /// Hour of day (UTC, 0-23) at which "daily" subscribers receive their digest.
    #[serde(default = "SchedulerConfig::default_digest_daily_hour")]
    pub digest_daily_hour: u32,
    /// Period, in minutes, between auto-notifier runs.
    #[serde(default = "SchedulerConfig::default_notify_period_minutes")]
    pub notify_period_minutes: u64,
    /// Period, in minutes, between cleanup/archival sweeps.
    #[serde(default = "SchedulerConfig::default_cleanup_period_minutes")]
    pub cleanup_period_minutes: u64,
    /// Maximum items included in a single digest dispatch.
    #[serde(default = "SchedulerConfig::default_digest_max_items")]
    pub digest_max_items: i64,
}

impl SchedulerConfig {
    fn default_digest_hourly_period_minutes() -> u64 {
        60
    }
    fn default_digest_daily_hour() -> u32 {
        8
    }
    fn default_notify_period_minutes() -> u64 {
        10
    }
    fn default_cleanup_period_minutes() -> u64 {
        240
    }
    fn default_digest_max_items() -> i64 {
        20
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            digest_hourly_period_minutes: Self::default_digest_hourly_period_minutes(),
            digest_daily_hour: Self::default_digest_daily_hour(),
            notify_period_minutes: Self::default_notify_period_minutes(),
            cleanup_period_minutes: Self::default_cleanup_period_minutes(),
            digest_max_items: Self::default_digest_max_items(),
        }
    }
}

/// Ingestion pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Capacity of the bounded enrichment work queue.
    #[serde(default = "IngestionConfig::default_queue_capacity")]
    pub queue_capacity: usize,
    /// Maximum retry attempts for a transient enrichment failure before giving up.
    #[serde(default = "IngestionConfig::default_max_retries")]
    pub max_retries: u32,
    /// Base delay, in milliseconds, for the enrichment retry backoff (doubled per attempt).
    #[serde(default = "IngestionConfig::default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// `source_type` values that are auto-approved on ingest instead of starting `pending`.
    #[serde(default = "IngestionConfig::default_trusted_source_types")]
    pub trusted_source_types: Vec<String>,
    /// Default freshness window, in hours, applied when a submission omits `expires_at`.
    #[serde(default = "IngestionConfig::default_ttl_hours")]
    pub default_ttl_hours: i64,
}

impl IngestionConfig {
    fn default_queue_capacity() -> usize {
        256
    }
    fn default_max_retries() -> u32 {
        5
    }
    fn default_retry_base_delay_ms() -> u64 {
        500
    }
    fn default_trusted_source_types() -> Vec<String> {
        vec!["manual".to_string()]
    }
    fn default_ttl_hours() -> i64 {
        5
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: Self::default_queue_capacity(),
            max_retries: Self::default_max_retries(),
            retry_base_delay_ms: Self::default_retry_base_delay_ms(),
            trusted_source_types: Self::default_trusted_source_types(),
            default_ttl_hours: Self::default_ttl_hours(),
        }
    }
}

/// Safe-mode filtering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeModeConfig {
    #[serde(default = "SafeModeConfig::default_nsfw_tags")]
    pub nsfw_tags: Vec<String>,
}

impl SafeModeConfig {
    fn default_nsfw_tags() -> Vec<String> {
        vec!["18+".to_string(), "NSFW".to_string()]
    }
}

impl Default for SafeModeConfig {
    fn default() -> Self {
        Self {
            nsfw_tags: Self::default_nsfw_tags(),
        }
    }
}

/// Trending formula configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingConfig {
    #[serde(default = "TrendingConfig::default_window_hours")]
    pub window_hours: i64,
    #[serde(default = "TrendingConfig::default_rating_weight")]
    pub rating_weight: f64,
}

impl TrendingConfig {
    fn default_window_hours() -> i64 {
        24
    }
    fn default_rating_weight() -> f64 {
        10.0
    }
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            window_hours: Self::default_window_hours(),
            rating_weight: Self::default_rating_weight(),
        }
    }
}

/// Referral/premium configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumConfig {
    #[serde(default = "PremiumConfig::default_invite_premium_days")]
    pub invite_premium_days: i64,
    #[serde(default = "PremiumConfig::default_registration_premium_days")]
    pub registration_premium_days: i64,
}

impl PremiumConfig {
    fn default_invite_premium_days() -> i64 {
        7
    }
    fn default_registration_premium_days() -> i64 {
        30
    }
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            invite_premium_days: Self::default_invite_premium_days(),
            registration_premium_days: Self::default_registration_premium_days(),
        }
    }
}

/// Chat front-end dispatch configuration (outbound digest/notification delivery)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatFrontendConfig {
    /// Base URL of the chat front-end's dispatch HTTP interface, or `None` to use a no-op dispatcher.
    pub base_url: Option<String>,
    #[serde(default = "ChatFrontendConfig::default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl ChatFrontendConfig {
    fn default_timeout_seconds() -> u64 {
        30
    }
}

impl Default for ChatFrontendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: Self::default_timeout_seconds(),
        }
    }
}

/// Remote enrichment provider config (used if `enrichment.provider = "remote"`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEnrichmentConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
}

/// Enrichment provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// "stub" or "remote"
    #[serde(default = "EnrichmentConfig::default_provider")]
    pub provider: String,
    pub remote: Option<RemoteEnrichmentConfig>,
}

impl EnrichmentConfig {
    fn default_provider() -> String {
        "stub".to_string()
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            provider: Self::default_provider(),
            remote: None,
        }
    }
}

/// Admin / maintenance config
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    pub auto_migrate: Option<bool>,
    pub diagnostics_dir: Option<String>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub safe_mode: SafeModeConfig,
    #[serde(default)]
    pub trending: TrendingConfig,
    #[serde(default)]
    pub premium: PremiumConfig,
    #[serde(default)]
    pub chat_frontend: ChatFrontendConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    pub admin: Option<AdminConfig>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Initialize an SQLite connection pool.
///
/// This function will create the parent directory if necessary, ensure the DB file exists
/// (attempting to create it if missing), and return a configured `SqlitePool`. Defaults are
/// conservative for resource-constrained platforms:
/// - max_connections: 5
/// - WAL journal mode, so resolver reads are not blocked by writer transactions
///
/// Example:
///   let pool = init_db_pool("data/newscope.db").await?;
pub async fn init_db_pool(path: &str) -> Result<SqlitePool> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create DB parent directory: {}", parent.display())
            })?;
        }
    }

    tokio::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to create or open DB file: {}", path))?;

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to sqlite database at path: {}", path))?;

    Ok(pool)
}

/// Convenience: sleep helper used by implementations (kept public for tests)
pub async fn sleep_millis(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::SystemTime;

    #[tokio::test]
    async fn config_from_string_and_db_pool() {
        let toml = r#"
            [database]
            path = "data/test.db"

            [scheduler]
            digest_hourly_period_minutes = 30

            [ingestion]
            queue_capacity = 64
        "#;

        let cfg: Config = toml::from_str(toml).expect("parse config");
        assert_eq!(cfg.scheduler.digest_hourly_period_minutes, 30);
        assert_eq!(cfg.ingestion.queue_capacity, 64);
        // untouched sections fall back to their serde defaults
        assert_eq!(cfg.scheduler.digest_daily_hour, 8);

        let now = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_millis();
        let dir = std::env::temp_dir().join(format!("newscope_test_{}", now));
        let _ = fs::create_dir_all(&dir);
        let db_path = dir.join("newscope.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = init_db_pool(&db_path_str).await.expect("init pool");
        let conn = pool.acquire().await.expect("acquire conn");
        drop(conn);
    }
}
