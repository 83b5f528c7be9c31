//! Worker and run-level result types.

use crate::telemetry::ResourceUsage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of one task attempt.
///
/// A successful report always carries a payload, an artifact URL, or both;
/// the constructors enforce this. Reports are immutable once produced — a
/// retried attempt produces a fresh one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerReport {
    /// Whether the task achieved its goal
    pub success: bool,
    /// Human-readable outcome description
    pub message: String,
    /// Structured data the task produced
    pub payload: Option<serde_json::Value>,
    /// Public URL of an uploaded artifact
    pub artifact_url: Option<String>,
}

impl WorkerReport {
    /// Build a success report carrying a payload and/or artifact URL.
    ///
    /// Falls back to a failure report if neither is supplied, preserving
    /// the success-implies-output invariant.
    #[must_use]
    pub fn success(
        message: impl Into<String>,
        payload: Option<serde_json::Value>,
        artifact_url: Option<String>,
    ) -> Self {
        let message = message.into();
        if payload.is_none() && artifact_url.is_none() {
            tracing::warn!(message = %message, "success report without output downgraded");
            return Self::failure(format!("{message} (no output produced)"));
        }
        Self {
            success: true,
            message,
            payload,
            artifact_url,
        }
    }

    /// Build a failure report.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
            artifact_url: None,
        }
    }
}

/// The terminal artifact of one orchestration run.
///
/// Built exactly once, after every task has settled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedReport {
    /// Address the run enriched
    pub address: String,
    /// Final report per task name
    pub results: BTreeMap<String, WorkerReport>,
    /// Names of tasks that succeeded
    pub successful_tasks: Vec<String>,
    /// Names of tasks that failed after exhausting retries
    pub failed_tasks: Vec<String>,
    /// Wall-clock duration of the run in seconds
    pub elapsed_secs: u64,
    /// Initial/peak/final resource snapshot
    pub resource_usage: ResourceUsage,
}

impl AggregatedReport {
    /// Assemble the report from settled task results.
    #[must_use]
    pub fn build(
        address: impl Into<String>,
        results: BTreeMap<String, WorkerReport>,
        elapsed_secs: u64,
        resource_usage: ResourceUsage,
    ) -> Self {
        let mut successful_tasks = Vec::new();
        let mut failed_tasks = Vec::new();
        for (name, report) in &results {
            if report.success {
                successful_tasks.push(name.clone());
            } else {
                failed_tasks.push(name.clone());
            }
        }
        Self {
            address: address.into(),
            results,
            successful_tasks,
            failed_tasks,
            elapsed_secs,
            resource_usage,
        }
    }

    /// Partial success is success: any one task finishing counts.
    #[must_use]
    pub fn overall_success(&self) -> bool {
        !self.successful_tasks.is_empty()
    }

    /// One-line summary for logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}/{} tasks completed successfully in {}s",
            self.successful_tasks.len(),
            self.results.len(),
            self.elapsed_secs
        )
    }
}
