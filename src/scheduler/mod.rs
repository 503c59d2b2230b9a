// SPDX-License-Identifier: MIT
//! Background scheduling — the daily analytics run and storage maintenance.
//!
//! The daily job fires at `schedule.hour:minute` in the configured fixed
//! UTC offset (default 08:05 at +05:30). Wall-clock scheduling rather than
//! a fixed interval: a daemon restarted at noon still runs at the next
//! morning slot, not 24 h after boot.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use tracing::{info, warn};

use crate::{analytics, AppContext};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Time until the next occurrence of `hour:minute` in the timezone at
/// `utc_offset_minutes`. Always in `(0, 24 h]` — a target equal to the
/// current instant schedules a full day ahead.
pub fn next_run_delay(
    now: DateTime<Utc>,
    hour: u32,
    minute: u32,
    utc_offset_minutes: i32,
) -> Duration {
    // Work in seconds-of-local-day; avoids any calendar arithmetic.
    let offset_secs = i64::from(utc_offset_minutes) * 60;
    let now_local_secs =
        (i64::from(now.num_seconds_from_midnight()) + offset_secs).rem_euclid(SECS_PER_DAY as i64)
            as u64;
    let target_secs = u64::from(hour.min(23)) * 3600 + u64::from(minute.min(59)) * 60;

    let delta = if target_secs > now_local_secs {
        target_secs - now_local_secs
    } else {
        SECS_PER_DAY - (now_local_secs - target_secs)
    };
    Duration::from_secs(delta)
}

/// Daily analytics loop. Never returns; spawned at startup.
///
/// Runs are skipped (with a warning) while credentials are unconfigured —
/// the daemon keeps serving stored snapshots regardless.
pub async fn run_daily(ctx: Arc<AppContext>) {
    let schedule = &ctx.config.schedule;
    loop {
        let delay = next_run_delay(
            Utc::now(),
            schedule.hour,
            schedule.minute,
            schedule.utc_offset_minutes,
        );
        info!(
            hour = schedule.hour,
            minute = schedule.minute,
            utc_offset_minutes = schedule.utc_offset_minutes,
            in_secs = delay.as_secs(),
            "next scheduled analytics run"
        );
        tokio::time::sleep(delay).await;

        if ctx.config.credentials.is_none() {
            warn!("scraper credentials not configured — skipping scheduled run");
            continue;
        }

        match analytics::run_and_store(&ctx).await {
            Ok(keywords) => info!(keywords, "scheduled analytics run complete"),
            Err(e) => warn!(err = %e, "scheduled analytics run failed"),
        }
    }
}

/// Daily storage maintenance: prune old snapshots, then vacuum.
/// First run after 1 h to stay clear of startup; then every 24 h.
pub async fn run_maintenance(ctx: Arc<AppContext>) {
    tokio::time::sleep(Duration::from_secs(60 * 60)).await;
    loop {
        match ctx
            .analytics
            .prune_older_than(ctx.config.snapshot_prune_days)
            .await
        {
            Ok(n) if n > 0 => {
                info!(pruned = n, days = ctx.config.snapshot_prune_days, "pruned old snapshots");
            }
            Ok(_) => {}
            Err(e) => warn!(err = %e, "snapshot pruning failed"),
        }
        if let Err(e) = ctx.storage.vacuum().await {
            warn!(err = %e, "sqlite vacuum failed");
        }
        tokio::time::sleep(Duration::from_secs(SECS_PER_DAY)).await;
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const IST: i32 = 330; // +05:30

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn default_schedule_lands_on_0235_utc() {
        // 08:05 IST == 02:35 UTC. From midnight UTC that is 2 h 35 m away.
        let delay = next_run_delay(utc(2026, 3, 1, 0, 0, 0), 8, 5, IST);
        assert_eq!(delay.as_secs(), 2 * 3600 + 35 * 60);
    }

    #[test]
    fn past_target_schedules_tomorrow() {
        // 03:00 UTC is 08:30 IST — already past 08:05, so next run is in
        // 23 h 35 m.
        let delay = next_run_delay(utc(2026, 3, 1, 3, 0, 0), 8, 5, IST);
        assert_eq!(delay.as_secs(), 23 * 3600 + 35 * 60);
    }

    #[test]
    fn exact_target_schedules_a_full_day_ahead() {
        let delay = next_run_delay(utc(2026, 3, 1, 2, 35, 0), 8, 5, IST);
        assert_eq!(delay.as_secs(), SECS_PER_DAY);
    }

    #[test]
    fn delay_is_always_within_a_day() {
        for h in 0..24 {
            for m in [0, 14, 59] {
                let delay = next_run_delay(utc(2026, 3, 1, h, m, 7), 8, 5, IST);
                assert!(delay.as_secs() > 0);
                assert!(delay.as_secs() <= SECS_PER_DAY);
            }
        }
    }

    #[test]
    fn negative_offsets_work() {
        // 08:05 at UTC-05:00 is 13:05 UTC; from 12:00 UTC that is 65 min.
        let delay = next_run_delay(utc(2026, 3, 1, 12, 0, 0), 8, 5, -300);
        assert_eq!(delay.as_secs(), 65 * 60);
    }

    #[test]
    fn zero_offset_is_plain_utc() {
        let delay = next_run_delay(utc(2026, 3, 1, 7, 0, 0), 8, 5, 0);
        assert_eq!(delay.as_secs(), 65 * 60);
    }

    #[test]
    fn out_of_range_schedule_values_are_clamped() {
        // hour 99 clamps to 23 — the job still fires once a day.
        let delay = next_run_delay(utc(2026, 3, 1, 0, 0, 0), 99, 99, 0);
        assert_eq!(delay.as_secs(), 23 * 3600 + 59 * 60);
    }
}
