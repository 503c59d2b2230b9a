// SPDX-License-Identifier: MIT
//! Observability utilities.
//!
//! Structured logging helpers and latency tracking for scrape runs and
//! REST handlers.

use std::time::Instant;
use tracing::{debug, info};

/// Track latency of an async operation and emit a structured log event.
pub struct LatencyTracker {
    operation: String,
    start: Instant,
}

impl LatencyTracker {
    /// Start tracking latency for an operation.
    ///
    /// Examples:
    ///   let tracker = LatencyTracker::start("analytics.run");
    pub fn start(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            start: Instant::now(),
        }
    }

    /// Finish tracking and emit a log event with the elapsed time.
    ///
    /// A full scrape run legitimately takes minutes, so the slow threshold
    /// here is only meant to catch stalls in the cheap operations (queries,
    /// handlers) that share this tracker.
    pub fn finish(self) {
        let elapsed_ms = self.start.elapsed().as_millis();
        if elapsed_ms > 1000 {
            info!(
                operation = %self.operation,
                elapsed_ms = elapsed_ms,
                "slow operation"
            );
        } else {
            debug!(
                operation = %self.operation,
                elapsed_ms = elapsed_ms,
                "operation complete"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_finishes_without_panicking() {
        let tracker = LatencyTracker::start("test.op");
        tracker.finish();
    }
}
