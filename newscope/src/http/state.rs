use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::Config;
use sqlx::SqlitePool;

use crate::dispatch::ChatDispatcher;
use crate::enrichment::EnrichmentProvider;
use crate::ingestion::IngestionHandle;

/// Rocket managed state: the connection pool plus everything a handler needs to reach the
/// rest of the system without reconstructing it per-request.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub db: SqlitePool,
    pub config: Arc<Config>,
    pub ingestion: IngestionHandle,
    pub dispatcher: Arc<dyn ChatDispatcher>,
    pub provider: Arc<dyn EnrichmentProvider>,
}
