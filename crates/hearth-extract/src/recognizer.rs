//! Text-recognition capability.
//!
//! Recognition is a black box to the rest of the workspace: an image path
//! goes in, UTF-8 text comes out, with no format contract beyond that. The
//! default implementation shells out to the `tesseract` CLI; tests and
//! callers that already have text use [`FixedRecognizer`].

use crate::error::{ExtractError, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Capability interface for turning a rendered image into text.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in the image at `path`.
    async fn recognize(&self, path: &Path) -> Result<String>;
}

/// Recognizer backed by the `tesseract` command-line engine.
#[derive(Debug, Clone, Default)]
pub struct TesseractRecognizer {
    /// Language code passed to the engine; empty means engine default
    pub language: String,
}

impl TesseractRecognizer {
    /// Create a recognizer for English text.
    #[must_use]
    pub fn english() -> Self {
        Self {
            language: "eng".to_string(),
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(ExtractError::Recognition(format!(
                "image not found: {}",
                path.display()
            )));
        }

        let mut cmd = Command::new("tesseract");
        cmd.arg(path).arg("stdout");
        if !self.language.is_empty() {
            cmd.arg("-l").arg(&self.language);
        }

        let output = cmd.output().await.map_err(|e| {
            ExtractError::EngineUnavailable(format!("failed to spawn tesseract: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Recognition(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::debug!(chars = text.len(), "recognition produced text");
        Ok(text)
    }
}

/// Recognizer that returns a fixed string, for tests and dry runs.
#[derive(Debug, Clone)]
pub struct FixedRecognizer {
    text: String,
}

impl FixedRecognizer {
    /// Create a recognizer that always returns `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl TextRecognizer for FixedRecognizer {
    async fn recognize(&self, _path: &Path) -> Result<String> {
        Ok(self.text.clone())
    }
}
