use anyhow::{Context as _, Result};
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking the daemon indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
/// Returns an error if the operation takes longer than `QUERY_TIMEOUT`.
pub(crate) async fn with_timeout<T>(
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "database query timed out after {}s",
            QUERY_TIMEOUT.as_secs()
        )),
    }
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Create storage with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn new_with_slow_query(data_dir: &Path, slow_query_ms: u64) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("pulsed.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    /// Used to create AnalyticsStorage that shares the same SQLite connection.
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        // Idempotent schema bootstrap — safe to run on every startup.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS snapshots (
                id          TEXT PRIMARY KEY,
                captured_at TEXT NOT NULL,
                payload     TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await
        .context("create snapshots table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_snapshots_captured_at
             ON snapshots (captured_at)",
        )
        .execute(pool)
        .await
        .context("create snapshots captured_at index")?;

        Ok(())
    }

    /// Cheap connectivity probe for the health endpoint and doctor checks.
    pub async fn ping(&self) -> Result<()> {
        with_timeout(async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .context("sqlite ping")?;
            Ok(())
        })
        .await
    }

    /// Reclaim space after pruning. Runs outside any transaction.
    pub async fn vacuum(&self) -> Result<()> {
        with_timeout(async {
            sqlx::query("VACUUM")
                .execute(&self.pool)
                .await
                .context("sqlite vacuum")?;
            Ok(())
        })
        .await
    }
}
