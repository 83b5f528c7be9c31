//! Registered-offender proximity map task.
//!
//! Drives the registry portal's autocomplete search (activate the widget
//! container, type into the revealed field, pick the top suggestion), lets
//! the map render, captures a screenshot, uploads it, and records the
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

/// Suggestion dropdown settle before picking the top entry.
const SUGGESTION_SETTLE_MS: u64 = 1000;

/// Collects the offender proximity map for an address.
pub struct OffenderMapTask {
    ctx: TaskContext,
    policy: RetryPolicy,
}

impl OffenderMapTask {
    /// Report key for this task.
    pub const NAME: &'static str = "offender-map";

    /// Create the task.
    #[must_use]
    pub fn new(ctx: TaskContext, policy: RetryPolicy) -> Self {
        Self { ctx, policy }
    }

    async fn execute(&self, address: &str) -> Result<WorkerReport> {
        let portal = self.ctx.config.portals.offender_map.clone();
        if portal.url.is_empty() {
            return Err(EnrichError::MissingSetting("portals.offender_map.url"));
        }
        with_session(&self.ctx, |session| self.flow(session, address)).await
    }

    async fn flow(
        &self,
        session: Arc<dyn SessionSurface>,
        address: &str,
    ) -> Result<WorkerReport> {
        let portal = &self.ctx.config.portals.offender_map;
        let driver = SessionDriver::new(session, self.ctx.step_timeout())
            .with_navigation_timeout(self.ctx.navigation_timeout());

        let shot = self
            .ctx
            .work_dir
            .join(format!("offender_map_{}.png", sanitize_filename(address)));

        let suggestions =
            SelectorChain::new([".select2-results__option", "[role='listbox'] [role='option']"]);

        driver
            .run(&[
                SessionStep::Navigate {
                    url: portal.url.clone(),
                },
                SessionStep::DismissConsent,
                SessionStep::Click {
                    target: SelectorChain::new([
                        "#select2-txtAutoComplete-container",
                        "[id*='AutoComplete'][class*='container']",
                        "[class*='search'] [role='combobox']",
                    ]),
                },
                SessionStep::Type {
                    target: SelectorChain::new([
                        ".select2-search__field",
                        "input[type='search']",
                        "input[role='searchbox']",
                    ]),
                    text: address.to_string(),
                },
                SessionStep::WaitForSignal {
                    target: suggestions.clone(),
                    required: true,
                },
                SessionStep::Settle {
                    millis: SUGGESTION_SETTLE_MS,
                },
                SessionStep::Click {
                    target: suggestions,
                },
                // The map-ready marker renders last; absence just means we
                // screenshot whatever state the page reached.
                SessionStep::WaitForSignal {
                    target: SelectorChain::new(["svg [id*='H_icon']", "#map", "[class*='map']"]),
                    required: false,
                },
                SessionStep::Settle {
                    millis: self.ctx.config.detector.settle_ms,
                },
                SessionStep::ScrollBy { y: 300 },
                SessionStep::Screenshot {
                    path: shot.clone(),
                    full_page: false,
                },
            ])
            .await?;

        let bytes = tokio::fs::read(&shot).await?;
        let name = artifact_name("offender_map", ".png");
        self.ctx
            .artifacts
            .upload(&portal.bucket, &name, bytes, "image/png")
            .await?;
        let url = self.ctx.artifacts.public_url(&portal.bucket, &name);

        let update = FieldUpdate::new().set(DataDomain::OffenderMap, json!([url.clone()]));
        let (updated, variant) =
            update_matching_rows(self.ctx.store.as_ref(), address, &update).await?;

        Ok(WorkerReport::success(
            "Offender map captured and recorded",
            Some(json!({ "updated_rows": updated, "matched_variant": variant })),
            Some(url),
        ))
    }
}

#[async_trait]
impl EnrichmentTask for OffenderMapTask {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    async fn run(&self, address: &str) -> WorkerReport {
        if address.trim().is_empty() {
            return WorkerReport::failure("offender-map failure: no address provided");
        }
        match self.execute(address).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(task = Self::NAME, error = %e, "attempt failed");
                WorkerReport::failure(format!("offender-map failure: {e}"))
            }
        }
    }
}
