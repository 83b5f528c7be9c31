//! The enrichment orchestrator.
//!
//! Launches every task concurrently under its retry decorator, waits for
//! all of them to settle — no task's failure cancels another — and builds
//! the aggregated report exactly once. The only synchronization point is
//! the final join; tasks share nothing but the record store.

use crate::report::{AggregatedReport, WorkerReport};
use crate::retry::run_with_retry;
use crate::task::EnrichmentTask;
use crate::telemetry::ResourceMonitor;
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs a set of enrichment tasks for one address.
pub struct EnrichmentOrchestrator {
    tasks: Vec<Arc<dyn EnrichmentTask>>,
    max_concurrent: usize,
    sample_interval: Duration,
}

impl EnrichmentOrchestrator {
    /// Create an orchestrator over the given tasks.
    #[must_use]
    pub fn new(tasks: Vec<Arc<dyn EnrichmentTask>>) -> Self {
        let max_concurrent = tasks.len().max(1);
        Self {
            tasks,
            max_concurrent,
            sample_interval: Duration::from_secs(2),
        }
    }

    /// Cap how many tasks run at once (defaults to all of them).
    #[must_use]
    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max.max(1);
        self
    }

    /// Override the resource sampler cadence.
    #[must_use]
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    /// Run every task to settlement and aggregate the results.
    ///
    /// Each task is wrapped in its own retry decorator; a task that
    /// exhausts its budget contributes its last failure report. The report
    /// is assembled only after all tasks have settled.
    pub async fn run_all(&self, address: &str) -> AggregatedReport {
        let started = Instant::now();
        let monitor = ResourceMonitor::start(self.sample_interval);
        tracing::info!(address, tasks = self.tasks.len(), "enrichment run starting");

        let mut results: BTreeMap<String, WorkerReport> = BTreeMap::new();
        let mut in_flight = FuturesUnordered::new();

        for task in &self.tasks {
            let task = task.clone();
            let address = address.to_string();
            in_flight.push(async move {
                let name = task.name().to_string();
                let policy = task.retry_policy();
                let report = run_with_retry(&name, policy, || {
                    let task = task.clone();
                    let address = address.clone();
                    async move { task.run(&address).await }
                })
                .await;
                (name, report)
            });

            while in_flight.len() >= self.max_concurrent {
                if let Some((name, report)) = in_flight.next().await {
                    results.insert(name, report);
                }
            }
        }

        while let Some((name, report)) = in_flight.next().await {
            results.insert(name, report);
        }

        let resource_usage = monitor.finish();
        let report = AggregatedReport::build(
            address,
            results,
            started.elapsed().as_secs(),
            resource_usage,
        );

        tracing::info!(
            address,
            summary = %report.summary(),
            successful = ?report.successful_tasks,
            failed = ?report.failed_tasks,
            peak_rss_mb = report.resource_usage.peak_rss_mb,
            "enrichment run finished"
        );
        report
    }
}
