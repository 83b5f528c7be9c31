//! The concrete enrichment tasks.
//!
//! Each task composes the session driver, completion detection, and store
//! writes into one independent data-collection unit. Flows are expressed as
//! data (step lists with selector chains) so portal quirks stay out of the
//! control logic.

pub mod climate_risk;
pub mod offender_map;
pub mod school_district;
pub mod valuation;

pub use climate_risk::ClimateRiskTask;
pub use offender_map::OffenderMapTask;
pub use school_district::SchoolDistrictTask;
pub use valuation::ValuationReportTask;

use crate::retry::RetryPolicy;
use crate::task::{EnrichmentTask, TaskContext};
use std::sync::Arc;

/// The standard four-task enrichment set, with the configured retry budget.
#[must_use]
pub fn standard_tasks(ctx: &TaskContext) -> Vec<Arc<dyn EnrichmentTask>> {
    let policy = RetryPolicy::from_config(&ctx.config.orchestrator);
    vec![
        Arc::new(OffenderMapTask::new(ctx.clone(), policy)),
        Arc::new(SchoolDistrictTask::new(ctx.clone(), policy)),
        Arc::new(ValuationReportTask::new(ctx.clone(), policy)),
        Arc::new(ClimateRiskTask::new(ctx.clone(), policy)),
    ]
}
