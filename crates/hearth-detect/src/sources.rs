//! Signal sources the detector polls.
//!
//! Each source answers one question per probe: "is the thing I watch for
//! here yet, and what is it called?". Sources carry their own state — the
//! novelty source snapshots the watched directory at construction time and
//! compares against it on every probe — so nothing ambient persists between
//! polling cycles.

use crate::error::Result;
use async_trait::async_trait;
use hearth_browser::SessionSurface;
use hearth_core::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::watch;

/// Where a completion signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// A file appeared in a watched directory
    Filesystem,
    /// An element appeared in the page
    Dom,
    /// An out-of-band event fired
    Event,
}

/// The first satisfied indicator that an asynchronous artifact is ready.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSignal {
    /// Kind of source that fired
    pub kind: SignalKind,
    /// Identifier the source matched (file name, selector, event label)
    pub matched: String,
    /// When the signal was observed
    pub detected_at: Timestamp,
}

/// One pollable completion indicator.
#[async_trait]
pub trait SignalSource: Send {
    /// Kind reported in the winning [`CompletionSignal`].
    fn kind(&self) -> SignalKind;

    /// Human-readable description for logs.
    fn describe(&self) -> String;

    /// Check once whether the source is satisfied, returning the matched
    /// identifier if so. Unmatched sources are re-probed every cycle.
    async fn probe(&mut self) -> Result<Option<String>>;
}

/// List file names in `dir` with the given extension.
async fn list_files(dir: &Path, extension: &str) -> Result<HashSet<String>> {
    let mut names = HashSet::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if extension.is_empty() || name.ends_with(extension) {
            names.insert(name);
        }
    }
    Ok(names)
}

/// Named-pattern download detection: a new file whose name starts with a
/// known prefix. Preferred over novelty detection when both match.
pub struct PrefixFileSource {
    dir: PathBuf,
    prefix: String,
    extension: String,
    preexisting: HashSet<String>,
}

impl PrefixFileSource {
    /// Create the source, snapshotting files already present so only files
    /// produced after this moment can satisfy it.
    pub async fn new(dir: impl Into<PathBuf>, prefix: &str, extension: &str) -> Result<Self> {
        let dir = dir.into();
        let preexisting = list_files(&dir, extension).await?;
        Ok(Self {
            dir,
            prefix: prefix.to_string(),
            extension: extension.to_string(),
            preexisting,
        })
    }

    /// Full path for a matched file name.
    #[must_use]
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

#[async_trait]
impl SignalSource for PrefixFileSource {
    fn kind(&self) -> SignalKind {
        SignalKind::Filesystem
    }

    fn describe(&self) -> String {
        format!(
            "file {}{}* in {}",
            self.prefix,
            self.extension,
            self.dir.display()
        )
    }

    async fn probe(&mut self) -> Result<Option<String>> {
        let current = list_files(&self.dir, &self.extension).await?;
        let mut fresh: Vec<String> = current
            .into_iter()
            .filter(|name| name.starts_with(&self.prefix) && !self.preexisting.contains(name))
            .collect();
        fresh.sort();
        Ok(fresh.into_iter().next())
    }
}

/// Generic novelty detection: any file not present in the pre-action
/// snapshot, minus names matching known-uninteresting prefixes (the request
/// sheet a task itself wrote, for instance).
pub struct NewFileSource {
    dir: PathBuf,
    extension: String,
    ignore_prefixes: Vec<String>,
    snapshot: HashSet<String>,
}

impl NewFileSource {
    /// Create the source, snapshotting the directory's current contents.
    pub async fn new(
        dir: impl Into<PathBuf>,
        extension: &str,
        ignore_prefixes: Vec<String>,
    ) -> Result<Self> {
        let dir = dir.into();
        let snapshot = list_files(&dir, extension).await?;
        Ok(Self {
            dir,
            extension: extension.to_string(),
            ignore_prefixes,
            snapshot,
        })
    }

    /// Full path for a matched file name.
    #[must_use]
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

#[async_trait]
impl SignalSource for NewFileSource {
    fn kind(&self) -> SignalKind {
        SignalKind::Filesystem
    }

    fn describe(&self) -> String {
        format!("new {} file in {}", self.extension, self.dir.display())
    }

    async fn probe(&mut self) -> Result<Option<String>> {
        let current = list_files(&self.dir, &self.extension).await?;
        let mut fresh: Vec<String> = current
            .into_iter()
            .filter(|name| !self.snapshot.contains(name))
            .filter(|name| !self.ignore_prefixes.iter().any(|p| name.starts_with(p)))
            .collect();
        fresh.sort();
        Ok(fresh.into_iter().next())
    }
}

/// Element-appearance detection against a live session.
pub struct DomSource {
    surface: Arc<dyn SessionSurface>,
    selector: String,
}

impl DomSource {
    /// Watch for `selector` to become visible on `surface`.
    #[must_use]
    pub fn new(surface: Arc<dyn SessionSurface>, selector: impl Into<String>) -> Self {
        Self {
            surface,
            selector: selector.into(),
        }
    }
}

#[async_trait]
impl SignalSource for DomSource {
    fn kind(&self) -> SignalKind {
        SignalKind::Dom
    }

    fn describe(&self) -> String {
        format!("element {}", self.selector)
    }

    async fn probe(&mut self) -> Result<Option<String>> {
        if self.surface.is_present(&self.selector).await? {
            Ok(Some(self.selector.clone()))
        } else {
            Ok(None)
        }
    }
}

/// Out-of-band completion event, set through a watch channel.
pub struct EventSource {
    label: String,
    rx: watch::Receiver<Option<String>>,
}

impl EventSource {
    /// Create an event source and the sender that satisfies it.
    #[must_use]
    pub fn channel(label: impl Into<String>) -> (watch::Sender<Option<String>>, Self) {
        let (tx, rx) = watch::channel(None);
        (
            tx,
            Self {
                label: label.into(),
                rx,
            },
        )
    }
}

#[async_trait]
impl SignalSource for EventSource {
    fn kind(&self) -> SignalKind {
        SignalKind::Event
    }

    fn describe(&self) -> String {
        format!("event {}", self.label)
    }

    async fn probe(&mut self) -> Result<Option<String>> {
        Ok(self.rx.borrow().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").await.expect("write file");
    }

    #[tokio::test]
    async fn test_prefix_source_ignores_preexisting() {
        let tmp = TempDir::new().expect("temp dir");
        touch(tmp.path(), "Report-old.xlsx").await;

        let mut source = PrefixFileSource::new(tmp.path(), "Report-", ".xlsx")
            .await
            .expect("create source");
        assert_eq!(source.probe().await.expect("probe"), None);

        touch(tmp.path(), "Report-new.xlsx").await;
        assert_eq!(
            source.probe().await.expect("probe"),
            Some("Report-new.xlsx".to_string())
        );
    }

    #[tokio::test]
    async fn test_prefix_source_ignores_other_names() {
        let tmp = TempDir::new().expect("temp dir");
        let mut source = PrefixFileSource::new(tmp.path(), "Report-", ".xlsx")
            .await
            .expect("create source");

        touch(tmp.path(), "unrelated.xlsx").await;
        touch(tmp.path(), "Report-final.csv").await;
        assert_eq!(source.probe().await.expect("probe"), None);
    }

    #[tokio::test]
    async fn test_new_file_source_respects_snapshot_and_ignores() {
        let tmp = TempDir::new().expect("temp dir");
        touch(tmp.path(), "already-there.xlsx").await;

        let mut source = NewFileSource::new(
            tmp.path(),
            ".xlsx",
            vec!["request_sheet_".to_string()],
        )
        .await
        .expect("create source");

        touch(tmp.path(), "request_sheet_123.xlsx").await;
        assert_eq!(source.probe().await.expect("probe"), None);

        touch(tmp.path(), "fresh-output.xlsx").await;
        assert_eq!(
            source.probe().await.expect("probe"),
            Some("fresh-output.xlsx".to_string())
        );
    }

    #[tokio::test]
    async fn test_dom_source_probes_surface() {
        let surface = Arc::new(hearth_browser::testing::FakeSurface::new());
        let mut source = DomSource::new(surface.clone(), ".results");
        assert_eq!(source.probe().await.expect("probe"), None);

        surface.add_element(".results", "");
        assert_eq!(
            source.probe().await.expect("probe"),
            Some(".results".to_string())
        );
    }

    #[tokio::test]
    async fn test_event_source() {
        let (tx, mut source) = EventSource::channel("render-finished");
        assert_eq!(source.probe().await.expect("probe"), None);

        tx.send(Some("render-finished".to_string()))
            .expect("send event");
        assert_eq!(
            source.probe().await.expect("probe"),
            Some("render-finished".to_string())
        );
    }
}
