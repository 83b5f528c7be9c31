//! Climate risk score task.
//!
//! The risk portal renders its five scores as styled figures with no
//! machine-readable source, so this task searches for the address, lets the
//! panel render, screenshots it, runs the screenshot through text
//! recognition, and extracts the `N/10` scores. Every factor column is
//! written — extracted or null — with its status marked complete, so a
//! partial read is recorded as such rather than retried forever.

use crate::error::{EnrichError, Result};
use crate::report::WorkerReport;
use crate::retry::RetryPolicy;
use crate::task::{
    sanitize_filename, update_matching_rows, with_session, EnrichmentTask, TaskContext,
};
use async_trait::async_trait;
use hearth_browser::{SelectorChain, SessionDriver, SessionStep, SessionSurface};
use hearth_core::DataDomain;
use hearth_extract::extract_risk_scores;
use hearth_store::FieldUpdate;
use serde_json::{json, Value};
use std::sync::Arc;

/// Page settle after navigation, before the consent scan.
const PAGE_SETTLE_MS: u64 = 3000;

/// Settle between typing the address and submitting the search.
const INPUT_SETTLE_MS: u64 = 3000;

/// Render settle after the risk panel signal, before the screenshot.
const RENDER_SETTLE_MS: u64 = 8000;

/// Collects the five climate risk scores for an address.
pub struct ClimateRiskTask {
    ctx: TaskContext,
    policy: RetryPolicy,
}

impl ClimateRiskTask {
    /// Report key for this task.
    pub const NAME: &'static str = "climate-risk";

    /// Create the task.
    #[must_use]
    pub fn new(ctx: TaskContext, policy: RetryPolicy) -> Self {
        Self { ctx, policy }
    }

    async fn execute(&self, address: &str) -> Result<WorkerReport> {
        let portal = self.ctx.config.portals.climate_risk.clone();
        if portal.url.is_empty() {
            return Err(EnrichError::MissingSetting("portals.climate_risk.url"));
        }
        with_session(&self.ctx, |session| self.flow(session, address)).await
    }

    async fn flow(
        &self,
        session: Arc<dyn SessionSurface>,
        address: &str,
    ) -> Result<WorkerReport> {
        let portal = &self.ctx.config.portals.climate_risk;
        let driver = SessionDriver::new(session, self.ctx.step_timeout())
            .with_navigation_timeout(self.ctx.navigation_timeout());

        let shot = self
            .ctx
            .work_dir
            .join(format!("climate_risk_{}.png", sanitize_filename(address)));

        let search_input = SelectorChain::new([
            "input[placeholder*='address' i]",
            "input[placeholder*='search' i]",
            "input[name='address']",
            "input[id*='address']",
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
                SessionStep::DismissConsent,
                SessionStep::Type {
                    target: search_input.clone(),
                    text: address.to_string(),
                },
                SessionStep::Settle {
                    millis: INPUT_SETTLE_MS,
                },
                SessionStep::PressKey {
                    target: search_input,
                    key: "Enter".to_string(),
                },
                SessionStep::WaitForSignal {
                    target: SelectorChain::new([
                        "[class*='risk']",
                        "[class*='factor']",
                        "[class*='score']",
                    ]),
                    required: false,
                },
                SessionStep::Settle {
                    millis: RENDER_SETTLE_MS,
                },
                SessionStep::Screenshot {
                    path: shot.clone(),
                    full_page: true,
                },
            ])
            .await?;

        let text = self.ctx.recognizer.recognize(&shot).await?;
        let scores = extract_risk_scores(&text);
        tracing::info!(
            extracted = scores.extracted_count(),
            "risk scores extracted"
        );

        let mut update = FieldUpdate::new();
        for domain in DataDomain::risk_factors() {
            let value = scores
                .get(domain)
                .map_or(Value::Null, |s| Value::String(s.to_string()));
            update = update.set(domain, value);
        }

        let (updated, variant) =
            update_matching_rows(self.ctx.store.as_ref(), address, &update).await?;

        Ok(WorkerReport::success(
            format!(
                "Climate risk scores recorded ({}/5 extracted)",
                scores.extracted_count()
            ),
            Some(json!({
                "scores": scores,
                "updated_rows": updated,
                "matched_variant": variant,
            })),
            None,
        ))
    }
}

#[async_trait]
impl EnrichmentTask for ClimateRiskTask {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    async fn run(&self, address: &str) -> WorkerReport {
        if address.trim().is_empty() {
            return WorkerReport::failure("climate-risk failure: no address provided");
        }
        match self.execute(address).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(task = Self::NAME, error = %e, "attempt failed");
                WorkerReport::failure(format!("climate-risk failure: {e}"))
            }
        }
    }
}
