pub mod analytics;
pub mod config;
pub mod doctor;
pub mod observability;
pub mod rest;
pub mod retry;
pub mod scheduler;
pub mod scraper;
pub mod sentiment;
pub mod storage;
pub mod webdriver;

use std::sync::Arc;

use anyhow::Result;

use analytics::storage::AnalyticsStorage;
use config::PulseConfig;
use storage::Storage;

/// Shared application state passed to every REST handler and background task.
pub struct AppContext {
    pub config: Arc<PulseConfig>,
    pub storage: Arc<Storage>,
    /// Snapshot query + write layer (shares the SQLite pool with `storage`).
    pub analytics: Arc<AnalyticsStorage>,
    /// Serializes scrape-and-score runs.  Only one WebDriver session may be
    /// live at a time — concurrent `/analytics` requests queue behind this.
    pub run_lock: tokio::sync::Mutex<()>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    /// Open storage and wire up the shared state.
    ///
    /// The snapshot schema is bootstrapped here, before the REST server or
    /// the scheduler touch the database.
    pub async fn new(config: Arc<PulseConfig>) -> Result<Arc<Self>> {
        let storage = Arc::new(
            Storage::new_with_slow_query(
                &config.data_dir,
                config.observability.slow_query_threshold_ms,
            )
            .await?,
        );
        let analytics = Arc::new(AnalyticsStorage::new(storage.pool()));

        Ok(Arc::new(Self {
            config,
            storage,
            analytics,
            run_lock: tokio::sync::Mutex::new(()),
            started_at: std::time::Instant::now(),
        }))
    }
}
