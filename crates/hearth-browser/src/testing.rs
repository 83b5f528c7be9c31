//! Scripted in-memory surface for tests.
//!
//! Drives the [`SessionSurface`] trait without a browser: elements and
//! banner buttons are registered up front, every interaction is logged, and
//! assertions read the log back. Used by this crate's own tests and by
//! downstream crates exercising flows end-to-end.

use crate::error::{BrowserError, Result};
use crate::surface::SessionSurface;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct FakeElement {
    value: String,
    input_fired: bool,
}

#[derive(Debug, Default)]
struct Inner {
    elements: HashMap<String, FakeElement>,
    buttons: Vec<(String, String)>,
    appear_after: HashMap<String, u32>,
    log: Vec<String>,
    clicked_texts: Vec<String>,
    navigate_error: Option<String>,
    closed: bool,
}

/// Scripted fake implementing [`SessionSurface`].
#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
    inner: Arc<Mutex<Inner>>,
}

impl FakeSurface {
    /// Create an empty fake with no elements present.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a visible, interactable input-like element.
    pub fn add_element(&self, selector: &str, value: &str) {
        let mut inner = self.inner.lock().expect("fake surface lock");
        inner.elements.insert(
            selector.to_string(),
            FakeElement {
                value: value.to_string(),
                input_fired: false,
            },
        );
    }

    /// Register an element that only becomes visible after `probes`
    /// presence checks, to exercise bounded waiting.
    pub fn add_element_after(&self, selector: &str, probes: u32) {
        let mut inner = self.inner.lock().expect("fake surface lock");
        inner.appear_after.insert(selector.to_string(), probes);
    }

    /// Register a button with the given text under a scope selector, as the
    /// consent scanner would find it.
    pub fn add_button(&self, scope: &str, text: &str) {
        let mut inner = self.inner.lock().expect("fake surface lock");
        inner.buttons.push((scope.to_string(), text.to_string()));
    }

    /// Make subsequent navigations fail with an engine error.
    pub fn fail_navigation(&self, message: &str) {
        let mut inner = self.inner.lock().expect("fake surface lock");
        inner.navigate_error = Some(message.to_string());
    }

    /// The interaction log, in order.
    #[must_use]
    pub fn log(&self) -> Vec<String> {
        self.inner.lock().expect("fake surface lock").log.clone()
    }

    /// Texts clicked through [`SessionSurface::click_by_text`], in order.
    #[must_use]
    pub fn clicked_texts(&self) -> Vec<String> {
        self.inner
            .lock()
            .expect("fake surface lock")
            .clicked_texts
            .clone()
    }

    /// Current value of a registered element.
    #[must_use]
    pub fn value_of(&self, selector: &str) -> Option<String> {
        self.inner
            .lock()
            .expect("fake surface lock")
            .elements
            .get(selector)
            .map(|e| e.value.clone())
    }

    /// Whether a fill dispatched the input notification on this element.
    #[must_use]
    pub fn input_event_fired(&self, selector: &str) -> bool {
        self.inner
            .lock()
            .expect("fake surface lock")
            .elements
            .get(selector)
            .is_some_and(|e| e.input_fired)
    }

    /// Whether the session was released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lock().expect("fake surface lock").closed
    }

    fn push_log(&self, entry: String) {
        self.inner.lock().expect("fake surface lock").log.push(entry);
    }
}

#[async_trait]
impl SessionSurface for FakeSurface {
    async fn navigate(&self, url: &str) -> Result<()> {
        let error = {
            let inner = self.inner.lock().expect("fake surface lock");
            inner.navigate_error.clone()
        };
        if let Some(message) = error {
            return Err(BrowserError::Engine(message));
        }
        self.push_log(format!("navigate {url}"));
        Ok(())
    }

    async fn is_present(&self, selector: &str) -> Result<bool> {
        let mut inner = self.inner.lock().expect("fake surface lock");
        if let Some(remaining) = inner.appear_after.get_mut(selector) {
            if *remaining == 0 {
                return Ok(true);
            }
            *remaining -= 1;
            return Ok(false);
        }
        Ok(inner.elements.contains_key(selector)
            || inner.buttons.iter().any(|(scope, _)| scope == selector))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.push_log(format!("click {selector}"));
        Ok(())
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().expect("fake surface lock");
        let element = inner
            .elements
            .get_mut(selector)
            .ok_or_else(|| BrowserError::Engine(format!("no element {selector}")))?;
        element.value = value.to_string();
        element.input_fired = true;
        inner.log.push(format!("fill {selector}={value}"));
        Ok(())
    }

    async fn press_key(&self, selector: &str, key: &str) -> Result<()> {
        self.push_log(format!("press {key} on {selector}"));
        Ok(())
    }

    async fn element_texts(&self, selector: &str) -> Result<Vec<String>> {
        let inner = self.inner.lock().expect("fake surface lock");
        Ok(inner
            .buttons
            .iter()
            .filter(|(scope, _)| scope == selector)
            .map(|(_, text)| text.clone())
            .collect())
    }

    async fn click_by_text(&self, selector: &str, text: &str) -> Result<bool> {
        let mut inner = self.inner.lock().expect("fake surface lock");
        let found = inner
            .buttons
            .iter()
            .any(|(scope, t)| scope == selector && t.trim() == text);
        if found {
            inner.clicked_texts.push(text.to_string());
            inner.log.push(format!("click '{text}'"));
        }
        Ok(found)
    }

    async fn extract_text(&self, selector: &str) -> Result<String> {
        let inner = self.inner.lock().expect("fake surface lock");
        Ok(inner
            .elements
            .get(selector)
            .map(|e| e.value.clone())
            .unwrap_or_default())
    }

    async fn scroll_by(&self, y: i64) -> Result<()> {
        self.push_log(format!("scroll {y}"));
        Ok(())
    }

    async fn screenshot_to(&self, path: &Path, full_page: bool) -> Result<()> {
        let _ = tokio::fs::write(path, b"fake-screenshot").await;
        self.push_log(format!(
            "screenshot {} full_page={full_page}",
            path.display()
        ));
        Ok(())
    }

    async fn upload_file(&self, selector: &str, path: &Path) -> Result<()> {
        self.push_log(format!("upload {} to {selector}", path.display()));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut inner = self.inner.lock().expect("fake surface lock");
        inner.closed = true;
        inner.log.push("close".to_string());
        Ok(())
    }
}
