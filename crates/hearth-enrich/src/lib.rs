//! Hearth Enrich - concurrent enrichment workers and their orchestrator.
//!
//! This crate ties the workspace together: each worker combines the session
//! driver, completion detector, extraction engine, and store clients into
//! one independent data-collection task, and the orchestrator runs all of
//! them concurrently with isolated failure and retry, aggregating settled
//! results into a single report.
//!
//! # Example
//!
//! ```rust,ignore
//! use hearth_enrich::{standard_tasks, EnrichmentOrchestrator, TaskContext};
//!
//! let tasks = standard_tasks(&ctx);
//! let orchestrator = EnrichmentOrchestrator::new(tasks);
//! let report = orchestrator.run_all("123 Main St, Springfield, IL 62704").await;
//! println!("{}", report.summary());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod error;
pub mod orchestrator;
pub mod report;
pub mod retry;
pub mod task;
pub mod tasks;
pub mod telemetry;
pub mod testing;

pub use error::{EnrichError, Result};
pub use orchestrator::EnrichmentOrchestrator;
pub use report::{AggregatedReport, WorkerReport};
pub use retry::{run_with_retry, RetryPolicy};
pub use task::{EngineSessionFactory, EnrichmentTask, SessionFactory, TaskContext};
pub use tasks::{
    standard_tasks, ClimateRiskTask, OffenderMapTask, SchoolDistrictTask, ValuationReportTask,
};
pub use telemetry::{ResourceMonitor, ResourceUsage};
