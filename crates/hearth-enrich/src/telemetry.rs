//! Background resource usage sampling.
//!
//! Purely observational: a sampler records the process's resident set at a
//! fixed cadence for the duration of a run, and the aggregated report
//! carries the initial/peak/final snapshot. Sampling never affects task
//! correctness and a platform without `/proc` simply reports zeros.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Initial/peak/final resident-set snapshot in megabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// RSS when the run started
    pub initial_rss_mb: f64,
    /// Highest RSS sampled during the run
    pub peak_rss_mb: f64,
    /// RSS when the run finished
    pub final_rss_mb: f64,
}

/// Samples process RSS on a background task until finished.
pub struct ResourceMonitor {
    handle: JoinHandle<()>,
    peak: Arc<AtomicU64>,
    initial: u64,
}

impl ResourceMonitor {
    /// Start sampling at the given cadence.
    #[must_use]
    pub fn start(sample_interval: Duration) -> Self {
        let initial = current_rss_bytes();
        let peak = Arc::new(AtomicU64::new(initial));

        let peak_clone = peak.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(sample_interval).await;
                let rss = current_rss_bytes();
                peak_clone.fetch_max(rss, Ordering::Relaxed);
            }
        });

        Self {
            handle,
            peak,
            initial,
        }
    }

    /// Stop sampling and produce the snapshot.
    #[must_use]
    pub fn finish(self) -> ResourceUsage {
        self.handle.abort();
        let final_rss = current_rss_bytes();
        let peak = self.peak.load(Ordering::Relaxed).max(final_rss);
        ResourceUsage {
            initial_rss_mb: to_mb(self.initial),
            peak_rss_mb: to_mb(peak),
            final_rss_mb: to_mb(final_rss),
        }
    }
}

fn to_mb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 / 1024.0 * 100.0).round() / 100.0
}

/// Resident set size of the current process, in bytes.
#[cfg(target_os = "linux")]
fn current_rss_bytes() -> u64 {
    // Second field of /proc/self/statm is resident pages.
    let Ok(statm) = std::fs::read_to_string("/proc/self/statm") else {
        return 0;
    };
    let Some(resident_pages) = statm
        .split_whitespace()
        .nth(1)
        .and_then(|v| v.parse::<u64>().ok())
    else {
        return 0;
    };
    resident_pages * 4096
}

#[cfg(not(target_os = "linux"))]
fn current_rss_bytes() -> u64 {
    0
}
