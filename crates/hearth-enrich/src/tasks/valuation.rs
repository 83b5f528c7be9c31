//! Valuation report task.
//!
//! The only credentialed flow: log into the portal, walk the data-explorer
//! wizard, attach a generated request sheet, trigger report generation, and
//! then detect the produced download. The portal emits no completion event,
//! so detection races a named-prefix filesystem source (preferred) against
//! a new-file fallback that ignores the request sheet itself. The detected
//! workbook is uploaded under a collision-resistant name and never kept
//! locally.

use crate::error::{EnrichError, Result};
use crate::report::WorkerReport;
use crate::retry::RetryPolicy;
use crate::task::{
    consume_file, sanitize_filename, update_matching_rows, with_session, EnrichmentTask,
    TaskContext,
};
use async_trait::async_trait;
use hearth_address::split_street_zip;
use hearth_browser::{SelectorChain, SessionDriver, SessionStep, SessionSurface};
use hearth_core::DataDomain;
use hearth_detect::{CompletionDetector, NewFileSource, PrefixFileSource, SignalSource};
use hearth_store::{artifact_name, FieldUpdate};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// MIME type of the generated workbook.
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Prefix of request sheets this task writes; the novelty source must never
/// mistake one for the portal's output.
const REQUEST_SHEET_PREFIX: &str = "request_sheet_";

/// Post-login settle while the dashboard assembles.
const LOGIN_SETTLE_MS: u64 = 5000;

/// Wizard transition settle between steps.
const WIZARD_SETTLE_MS: u64 = 3000;

/// Generates and collects the valuation report for an address.
pub struct ValuationReportTask {
    ctx: TaskContext,
    policy: RetryPolicy,
}

impl ValuationReportTask {
    /// Report key for this task.
    pub const NAME: &'static str = "valuation-report";

    /// Create the task.
    #[must_use]
    pub fn new(ctx: TaskContext, policy: RetryPolicy) -> Self {
        Self { ctx, policy }
    }

    async fn execute(&self, address: &str) -> Result<WorkerReport> {
        let portal = self.ctx.config.portals.valuation.clone();
        if portal.url.is_empty() {
            return Err(EnrichError::MissingSetting("portals.valuation.url"));
        }
        if portal.email.is_empty() || portal.password.is_empty() {
            return Err(EnrichError::MissingSetting(
                "portals.valuation.email / portals.valuation.password",
            ));
        }

        let sheet = self.write_request_sheet(address).await?;
        with_session(&self.ctx, |session| self.flow(session, address, &sheet)).await
    }

    /// Stage the one-row request sheet the portal consumes.
    async fn write_request_sheet(&self, address: &str) -> Result<std::path::PathBuf> {
        let (street, zip) = split_street_zip(address);
        let path = self.ctx.download_dir().join(format!(
            "{REQUEST_SHEET_PREFIX}{}.csv",
            sanitize_filename(address)
        ));
        let contents = format!("client_file_id,address,zipcode\n1,\"{street}\",{zip}\n");
        tokio::fs::write(&path, contents).await?;
        tracing::debug!(path = %path.display(), "request sheet staged");
        Ok(path)
    }

    async fn flow(
        &self,
        session: Arc<dyn SessionSurface>,
        address: &str,
        sheet: &std::path::Path,
    ) -> Result<WorkerReport> {
        let portal = &self.ctx.config.portals.valuation;
        let detector_cfg = &self.ctx.config.detector;
        let driver = SessionDriver::new(session, self.ctx.step_timeout())
            .with_navigation_timeout(self.ctx.navigation_timeout());

        driver
            .run(&[
                SessionStep::Navigate {
                    url: portal.url.clone(),
                },
                SessionStep::ClickByText {
                    scope: "a, button".to_string(),
                    text: "log in".to_string(),
                },
                SessionStep::Type {
                    target: SelectorChain::new([
                        "input[type='email']",
                        "input[name='email']",
                        "input[id*='email']",
                        "input[placeholder*='email' i]",
                    ]),
                    text: portal.email.clone(),
                },
                SessionStep::Type {
                    target: SelectorChain::single("input[type='password']"),
                    text: portal.password.clone(),
                },
                SessionStep::ClickByText {
                    scope: "button[type='submit'], input[type='submit'], button".to_string(),
                    text: "log".to_string(),
                },
                SessionStep::Settle {
                    millis: LOGIN_SETTLE_MS,
                },
                SessionStep::ClickByText {
                    scope: "button, a".to_string(),
                    text: "launch".to_string(),
                },
                SessionStep::Settle {
                    millis: WIZARD_SETTLE_MS,
                },
                SessionStep::Click {
                    target: SelectorChain::new([
                        "input[type='checkbox'][name*='value' i]",
                        "input[type='checkbox'][id*='value' i]",
                        "[data-field='value'] input[type='checkbox']",
                    ]),
                },
                SessionStep::ClickByText {
                    scope: "button".to_string(),
                    text: "next".to_string(),
                },
                SessionStep::Settle {
                    millis: WIZARD_SETTLE_MS,
                },
                SessionStep::ClickByText {
                    scope: "button".to_string(),
                    text: "continue".to_string(),
                },
                SessionStep::UploadFile {
                    target: SelectorChain::single("input[type='file']"),
                    path: sheet.to_path_buf(),
                },
                SessionStep::Settle {
                    millis: WIZARD_SETTLE_MS,
                },
            ])
            .await?;

        // Snapshot the download directory before triggering generation so
        // only files produced by this click can satisfy detection.
        let download_dir = self.ctx.download_dir();
        let prefix_source =
            PrefixFileSource::new(&download_dir, &portal.report_prefix, ".xlsx").await?;
        let novelty_source = NewFileSource::new(
            &download_dir,
            ".xlsx",
            vec![REQUEST_SHEET_PREFIX.to_string()],
        )
        .await?;

        driver
            .run(&[SessionStep::ClickByText {
                scope: "button".to_string(),
                text: "generate".to_string(),
            }])
            .await?;

        let detector = CompletionDetector::new(
            Duration::from_secs(detector_cfg.timeout_secs),
            Duration::from_millis(detector_cfg.poll_interval_ms),
        )
        .with_settle(Duration::from_millis(detector_cfg.settle_ms));

        let mut sources: Vec<Box<dyn SignalSource>> = vec![
            Box::new(prefix_source),
            Box::new(novelty_source),
        ];
        let signal = detector.await_completion(&mut sources).await?;
        tracing::info!(file = %signal.matched, "report download detected");

        let bytes = consume_file(&download_dir.join(&signal.matched)).await?;
        let name = artifact_name("valuation_report", ".xlsx");
        self.ctx
            .artifacts
            .upload(&portal.bucket, &name, bytes, XLSX_MIME)
            .await?;
        let url = self.ctx.artifacts.public_url(&portal.bucket, &name);

        let update = FieldUpdate::new().set(DataDomain::ValuationReport, json!([url.clone()]));
        let (updated, variant) =
            update_matching_rows(self.ctx.store.as_ref(), address, &update).await?;

        Ok(WorkerReport::success(
            "Valuation report generated and recorded",
            Some(json!({
                "updated_rows": updated,
                "matched_variant": variant,
                "detected_file": signal.matched,
            })),
            Some(url),
        ))
    }
}

#[async_trait]
impl EnrichmentTask for ValuationReportTask {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    async fn run(&self, address: &str) -> WorkerReport {
        if address.trim().is_empty() {
            return WorkerReport::failure("valuation-report failure: no address provided");
        }
        match self.execute(address).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(task = Self::NAME, error = %e, "attempt failed");
                WorkerReport::failure(format!("valuation-report failure: {e}"))
            }
        }
    }
}
