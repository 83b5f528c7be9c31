//! The retry decorator applied to every task.
//!
//! A task attempt either succeeds or settles into a failure report — raw
//! errors never reach this layer. The decorator re-runs failed attempts
//! after a fixed delay, up to the attempt budget, and returns the last
//! report regardless of outcome. Each attempt re-runs the whole flow on a
//! fresh session; nothing resumes mid-flow.

use crate::report::WorkerReport;
use hearth_core::config::OrchestratorConfig;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Per-task retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, first try included; zero behaves as one
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl RetryPolicy {
    /// Create a policy.
    #[must_use]
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            max_attempts,
            retry_delay_ms: retry_delay.as_millis() as u64,
        }
    }

    /// Policy from orchestrator configuration.
    #[must_use]
    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_delay_ms: config.retry_delay_ms,
        }
    }

    fn delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&OrchestratorConfig::default())
    }
}

/// Run an operation under a retry policy and return its last report.
///
/// For an operation failing `k` times before succeeding with
/// `max_attempts >= k + 1`, the operation runs exactly `k + 1` times and
/// the success report is returned; otherwise it runs exactly
/// `max_attempts` times and the final failure report is returned.
pub async fn run_with_retry<F, Fut>(name: &str, policy: RetryPolicy, mut op: F) -> WorkerReport
where
    F: FnMut() -> Fut,
    Fut: Future<Output = WorkerReport>,
{
    let budget = policy.max_attempts.max(1);
    let mut last = WorkerReport::failure(format!("{name} never ran"));

    for attempt in 1..=budget {
        info!(task = name, attempt, budget, "attempt starting");
        let report = op().await;

        if report.success {
            info!(task = name, attempt, "attempt succeeded");
            return report;
        }

        warn!(
            task = name,
            attempt,
            budget,
            message = %report.message,
            "attempt failed"
        );
        last = report;

        if attempt < budget {
            tokio::time::sleep(policy.delay()).await;
        }
    }

    warn!(task = name, budget, "all attempts exhausted");
    last
}
