// SPDX-License-Identifier: MIT
//! Snapshot storage — query + write layer over the `snapshots` table.
//!
//! The schema itself is bootstrapped by `storage::Storage::migrate` at
//! startup; this layer assumes the table exists.

use anyhow::{Context as _, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::model::Snapshot;
use crate::storage::with_timeout;

pub struct AnalyticsStorage {
    pool: SqlitePool,
}

impl AnalyticsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist one completed run.
    pub async fn insert_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let id = Uuid::new_v4().to_string();
        let payload = serde_json::to_string(snapshot).context("serialize snapshot")?;

        with_timeout(async {
            sqlx::query("INSERT INTO snapshots (id, captured_at, payload) VALUES (?, ?, ?)")
                .bind(&id)
                .bind(&snapshot.timestamp)
                .bind(&payload)
                .execute(&self.pool)
                .await
                .context("insert snapshot")?;
            Ok(())
        })
        .await
    }

    /// The most recent stored run, or `None` when nothing has run yet.
    pub async fn latest_snapshot(&self) -> Result<Option<Snapshot>> {
        let row: Option<(String,)> = with_timeout(async {
            sqlx::query_as(
                "SELECT payload FROM snapshots ORDER BY captured_at DESC LIMIT 1",
            )
            .fetch_optional(&self.pool)
            .await
            .context("load latest snapshot")
        })
        .await?;

        match row {
            Some((payload,)) => {
                let snapshot =
                    serde_json::from_str(&payload).context("deserialize stored snapshot")?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    pub async fn snapshot_count(&self) -> Result<u64> {
        let count: i64 = with_timeout(async {
            sqlx::query_scalar("SELECT COUNT(*) FROM snapshots")
                .fetch_one(&self.pool)
                .await
                .context("count snapshots")
        })
        .await?;
        Ok(count as u64)
    }

    /// Delete snapshots older than `days`. 0 disables pruning.
    ///
    /// All timestamps are RFC 3339 UTC strings, so lexicographic comparison
    /// matches chronological order.
    pub async fn prune_older_than(&self, days: u32) -> Result<u64> {
        if days == 0 {
            return Ok(0);
        }
        let cutoff = (chrono::Utc::now() - chrono::Duration::days(i64::from(days))).to_rfc3339();

        let affected = with_timeout(async {
            sqlx::query("DELETE FROM snapshots WHERE captured_at < ?")
                .bind(&cutoff)
                .execute(&self.pool)
                .await
                .context("prune snapshots")
        })
        .await?
        .rows_affected();

        Ok(affected)
    }
}
