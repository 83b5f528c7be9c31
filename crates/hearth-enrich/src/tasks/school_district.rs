//! School district boundary map task.
//!
//! Searches the boundary-map portal for the address, waits for the result
//! view, captures a full-page screenshot, uploads it, and records the
//! public URL against every matching property row.

use crate::error::{EnrichError, Result};
use crate::report::WorkerReport;
use crate::retry::RetryPolicy;
use crate::task::{
    sanitize_filename, update_matching_rows, with_session, EnrichmentTask, TaskContext,
};
use async_trait::async_trait;
use hearth_browser::{SelectorChain, SessionDriver, SessionStep, SessionSurface};
use hearth_core::DataDomain;
use hearth_store::{artifact_name, FieldUpdate};
use serde_json::json;
use std::sync::Arc;

/// Page settle after navigation, before probing for the search bar.
const PAGE_SETTLE_MS: u64 = 5000;

/// Collects the school district boundary map for an address.
pub struct SchoolDistrictTask {
    ctx: TaskContext,
    policy: RetryPolicy,
}

impl SchoolDistrictTask {
    /// Report key for this task.
    pub const NAME: &'static str = "school-district";

    /// Create the task.
    #[must_use]
    pub fn new(ctx: TaskContext, policy: RetryPolicy) -> Self {
        Self { ctx, policy }
    }

    async fn execute(&self, address: &str) -> Result<WorkerReport> {
        let portal = self.ctx.config.portals.school_district.clone();
        if portal.url.is_empty() {
            return Err(EnrichError::MissingSetting("portals.school_district.url"));
        }
        with_session(&self.ctx, |session| self.flow(session, address)).await
    }

    async fn flow(
        &self,
        session: Arc<dyn SessionSurface>,
        address: &str,
    ) -> Result<WorkerReport> {
        let portal = &self.ctx.config.portals.school_district;
        let driver = SessionDriver::new(session, self.ctx.step_timeout())
            .with_navigation_timeout(self.ctx.navigation_timeout());

        let shot = self
            .ctx
            .work_dir
            .join(format!("school_district_{}.png", sanitize_filename(address)));

        let search_bar = SelectorChain::new([
            "input[placeholder*='address' i]",
            "input[placeholder*='search' i]",
            "input[placeholder*='location' i]",
            "input[aria-label*='search' i]",
            "input[name='q']",
            "input[type='text']",
        ]);

        driver
            .run(&[
                SessionStep::Navigate {
                    url: portal.url.clone(),
                },
                SessionStep::Settle {
                    millis: PAGE_SETTLE_MS,
                },
                SessionStep::Type {
                    target: search_bar.clone(),
                    text: address.to_string(),
                },
                SessionStep::PressKey {
                    target: search_bar,
                    key: "Enter".to_string(),
                },
                SessionStep::WaitForSignal {
                    target: SelectorChain::new([
                        "[class*='district']",
                        "[class*='boundary']",
                        "[class*='result']",
                    ]),
                    required: false,
                },
                SessionStep::Settle {
                    millis: self.ctx.config.detector.settle_ms,
                },
                SessionStep::Screenshot {
                    path: shot.clone(),
                    full_page: true,
                },
            ])
            .await?;

        let bytes = tokio::fs::read(&shot).await?;
        let name = artifact_name("school_district", ".png");
        self.ctx
            .artifacts
            .upload(&portal.bucket, &name, bytes, "image/png")
            .await?;
        let url = self.ctx.artifacts.public_url(&portal.bucket, &name);

        let update = FieldUpdate::new().set(DataDomain::SchoolDistrict, json!([url.clone()]));
        let (updated, variant) =
            update_matching_rows(self.ctx.store.as_ref(), address, &update).await?;

        Ok(WorkerReport::success(
            "School district map captured and recorded",
            Some(json!({ "updated_rows": updated, "matched_variant": variant })),
            Some(url),
        ))
    }
}

#[async_trait]
impl EnrichmentTask for SchoolDistrictTask {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    async fn run(&self, address: &str) -> WorkerReport {
        if address.trim().is_empty() {
            return WorkerReport::failure("school-district failure: no address provided");
        }
        match self.execute(address).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(task = Self::NAME, error = %e, "attempt failed");
                WorkerReport::failure(format!("school-district failure: {e}"))
            }
        }
    }
}
