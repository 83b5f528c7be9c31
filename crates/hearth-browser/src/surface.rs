//! The automation capability interface.
//!
//! Everything the session driver needs from a browser-like session is
//! expressed here. The production implementation wraps a Chromium page
//! ([`crate::engine::ChromiumSession`]); tests drive the same trait with a
//! scripted fake. One surface instance is exclusively owned by one task for
//! the duration of its flow.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Browser-like session primitives consumed by the driver.
#[async_trait]
pub trait SessionSurface: Send + Sync {
    /// Navigate to a URL and wait for the load to settle.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Whether `selector` currently resolves to a visible, interactable
    /// element. This is a single probe; bounded waiting lives in the driver.
    async fn is_present(&self, selector: &str) -> Result<bool>;

    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Clear the field matching `selector`, set `value`, and dispatch an
    /// input-changed notification so reactive widgets observe the edit.
    async fn fill_field(&self, selector: &str, value: &str) -> Result<()>;

    /// Press a key (e.g. `"Enter"`) on the element matching `selector`.
    async fn press_key(&self, selector: &str, key: &str) -> Result<()>;

    /// Trimmed text content of every visible element matching `selector`.
    async fn element_texts(&self, selector: &str) -> Result<Vec<String>>;

    /// Click the first visible element matching `selector` whose trimmed
    /// text equals `text`. Returns whether anything was clicked.
    async fn click_by_text(&self, selector: &str, text: &str) -> Result<bool>;

    /// Inner text of the first element matching `selector`.
    async fn extract_text(&self, selector: &str) -> Result<String>;

    /// Scroll the viewport vertically by `y` pixels.
    async fn scroll_by(&self, y: i64) -> Result<()>;

    /// Capture a screenshot to `path`.
    async fn screenshot_to(&self, path: &Path, full_page: bool) -> Result<()>;

    /// Attach a local file to the file input matching `selector`.
    async fn upload_file(&self, selector: &str, path: &Path) -> Result<()>;

    /// Release the session. Guaranteed to be called on success and failure
    /// paths alike; must be safe to call more than once.
    async fn close(&self) -> Result<()>;
}
