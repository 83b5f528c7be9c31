//! The worker abstraction and its shared context.
//!
//! A task is one independent data-collection unit for one address. Its
//! `run` never propagates an error: every failure is converted into a
//! structured report at this boundary, so the orchestrator only ever sees
//! settled results. Each attempt drives exactly one exclusively-owned
//! session, released on success and failure paths alike.

use crate::error::{EnrichError, Result};
use crate::report::WorkerReport;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use hearth_address::match_rows;
use hearth_browser::{BrowserEngine, ChromiumSession, SessionSurface};
use hearth_core::AppConfig;
use hearth_extract::TextRecognizer;
use hearth_store::{apply_to_rows, ArtifactStorage, FieldUpdate, RecordStore, StoreError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Creates a fresh session for each task attempt.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a new exclusively-owned session.
    async fn create(&self) -> hearth_browser::Result<Arc<dyn SessionSurface>>;
}

/// Production factory: one page per attempt from a shared engine, with
/// downloads routed into the work directory.
pub struct EngineSessionFactory {
    engine: Arc<BrowserEngine>,
    download_dir: Option<PathBuf>,
}

impl EngineSessionFactory {
    /// Create a factory over a launched engine.
    #[must_use]
    pub fn new(engine: Arc<BrowserEngine>, download_dir: Option<PathBuf>) -> Self {
        Self {
            engine,
            download_dir,
        }
    }
}

#[async_trait]
impl SessionFactory for EngineSessionFactory {
    async fn create(&self) -> hearth_browser::Result<Arc<dyn SessionSurface>> {
        let session: ChromiumSession = self.engine.new_session().await?;
        if let Some(dir) = &self.download_dir {
            session.set_download_dir(dir).await?;
        }
        Ok(Arc::new(session))
    }
}

/// Shared dependencies handed to every task.
#[derive(Clone)]
pub struct TaskContext {
    /// Session factory (engine-backed in production)
    pub sessions: Arc<dyn SessionFactory>,
    /// Record store client
    pub store: Arc<dyn RecordStore>,
    /// Artifact storage client
    pub artifacts: Arc<dyn ArtifactStorage>,
    /// Text recognition capability
    pub recognizer: Arc<dyn TextRecognizer>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Scratch directory for screenshots, request sheets, downloads
    pub work_dir: PathBuf,
}

impl TaskContext {
    /// Per-step timeout from configuration.
    #[must_use]
    pub fn step_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.browser.step_timeout_secs)
    }

    /// Navigation timeout from configuration.
    #[must_use]
    pub fn navigation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.browser.navigation_timeout_secs)
    }

    /// Directory portal downloads land in; falls back to the work dir.
    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        self.config
            .browser
            .download_dir
            .clone()
            .unwrap_or_else(|| self.work_dir.clone())
    }
}

/// One independent enrichment task.
#[async_trait]
pub trait EnrichmentTask: Send + Sync {
    /// Stable task name used as the report key.
    fn name(&self) -> &str;

    /// This task's retry budget.
    fn retry_policy(&self) -> RetryPolicy;

    /// Run one attempt for `address`. Never returns an error and never
    /// panics; failures settle into the report.
    async fn run(&self, address: &str) -> WorkerReport;
}

/// Run a task body with a fresh session, guaranteeing release on both paths.
pub(crate) async fn with_session<F, Fut>(
    ctx: &TaskContext,
    body: F,
) -> Result<WorkerReport>
where
    F: FnOnce(Arc<dyn SessionSurface>) -> Fut,
    Fut: std::future::Future<Output = Result<WorkerReport>>,
{
    let session = ctx.sessions.create().await?;
    let outcome = body(session.clone()).await;
    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "session release failed");
    }
    outcome
}

/// Resolve `address` against the store and apply `update` to every match.
///
/// Returns the number of rows updated and the variant that matched. All
/// matching rows receive the identical update; zero matches is an error the
/// caller reports (other tasks proceed regardless).
pub(crate) async fn update_matching_rows(
    store: &dyn RecordStore,
    address: &str,
    update: &FieldUpdate,
) -> Result<(usize, String)> {
    let rows = store.select_rows().await?;
    let matched = match_rows(address, &rows);
    if !matched.is_match() {
        return Err(EnrichError::Store(StoreError::NoMatch {
            address: address.to_string(),
        }));
    }
    let variant = matched.matched_variant.clone().unwrap_or_default();
    tracing::info!(
        address,
        variant = %variant,
        rows = matched.rows.len(),
        "address matched, updating rows"
    );
    let updated = apply_to_rows(store, &matched.rows, update).await?;
    Ok((updated, variant))
}

/// Sanitize an address into a filename-safe fragment.
#[must_use]
pub(crate) fn sanitize_filename(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_underscore = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    out.trim_matches('_').to_string()
}

/// Read and then remove a staged local file (a downloaded report that has
/// been uploaded keeps no local copy).
pub(crate) async fn consume_file(path: &Path) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path).await?;
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "could not remove staged file");
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("123 Main St, Springfield, IL 62704"),
            "123_Main_St_Springfield_IL_62704"
        );
        assert_eq!(sanitize_filename("  weird///name  "), "weird_name");
    }

    #[tokio::test]
    async fn test_consume_file_reads_and_removes() {
        let tmp = tempfile::TempDir::new().expect("temp dir");
        let path = tmp.path().join("staged.bin");
        tokio::fs::write(&path, b"payload").await.expect("write");

        let bytes = consume_file(&path).await.expect("consume");
        assert_eq!(bytes, b"payload");
        assert!(!path.exists());
    }
}
