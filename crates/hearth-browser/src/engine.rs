//! Chromium-backed implementation of the session surface.
//!
//! One [`BrowserEngine`] owns the browser process; each task asks it for a
//! fresh [`ChromiumSession`] (one page, exclusively owned) and releases it
//! when the flow ends. DOM reads and the clear-then-set typing behavior are
//! implemented as page-context script evaluation; clicks and key presses go
//! through trusted input events.

use crate::error::{BrowserError, Result};
use crate::surface::SessionSurface;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures_util::stream::StreamExt;
use std::path::Path;

/// Browser automation engine owning the underlying browser process.
pub struct BrowserEngine {
    browser: Browser,
    headless: bool,
}

impl BrowserEngine {
    /// Launch a browser per the given configuration.
    pub async fn launch(config: &hearth_core::config::BrowserConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(config.window_width, config.window_height);
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(BrowserError::Engine)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;

        // Drain CDP events for the lifetime of the browser.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        tracing::info!(headless = config.headless, "browser engine launched");
        Ok(Self {
            browser,
            headless: config.headless,
        })
    }

    /// Whether the engine runs headless.
    #[must_use]
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Open a fresh page for one task's exclusive use.
    pub async fn new_session(&self) -> Result<ChromiumSession> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        Ok(ChromiumSession { page })
    }
}

/// One exclusively-owned page implementing [`SessionSurface`].
pub struct ChromiumSession {
    page: Page,
}

impl ChromiumSession {
    /// Route this session's downloads into `dir`.
    pub async fn set_download_dir(&self, dir: &Path) -> Result<()> {
        let params = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::Allow)
            .download_path(dir.display().to_string())
            .build()
            .map_err(BrowserError::Engine)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        Ok(())
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Engine(e.to_string()))
    }
}

/// JSON-escape a string for embedding into a page-context script.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[async_trait::async_trait]
impl SessionSurface for ChromiumSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        url::Url::parse(url).map_err(|e| BrowserError::InvalidUrl(format!("{url}: {e}")))?;
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        Ok(())
    }

    async fn is_present(&self, selector: &str) -> Result<bool> {
        let script = format!(
            r"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                const style = window.getComputedStyle(el);
                if (style.display === 'none' || style.visibility === 'hidden') return false;
                const rect = el.getBoundingClientRect();
                if (rect.width === 0 && rect.height === 0) return false;
                return !el.disabled;
            }})()",
            sel = js_string(selector)
        );
        self.eval(script).await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        Ok(())
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        // Clear-then-set, with an input event so reactive widgets (typeahead
        // search fields in particular) observe the change.
        let script = format!(
            r"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.focus();
                el.value = '';
                el.value = {val};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()",
            sel = js_string(selector),
            val = js_string(value)
        );
        let ok: bool = self.eval(script).await?;
        if ok {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound {
                selectors: selector.to_string(),
            })
        }
    }

    async fn press_key(&self, selector: &str, key: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        element
            .press_key(key)
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        Ok(())
    }

    async fn element_texts(&self, selector: &str) -> Result<Vec<String>> {
        let script = format!(
            r"(() => {{
                return Array.from(document.querySelectorAll({sel}))
                    .filter(el => el.offsetParent !== null)
                    .map(el => (el.textContent || '').trim());
            }})()",
            sel = js_string(selector)
        );
        self.eval(script).await
    }

    async fn click_by_text(&self, selector: &str, text: &str) -> Result<bool> {
        let script = format!(
            r"(() => {{
                const wanted = {text};
                const el = Array.from(document.querySelectorAll({sel}))
                    .filter(el => el.offsetParent !== null)
                    .find(el => (el.textContent || '').trim() === wanted);
                if (!el) return false;
                el.click();
                return true;
            }})()",
            text = js_string(text),
            sel = js_string(selector)
        );
        self.eval(script).await
    }

    async fn extract_text(&self, selector: &str) -> Result<String> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        let text = element
            .inner_text()
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        Ok(text.unwrap_or_default())
    }

    async fn scroll_by(&self, y: i64) -> Result<()> {
        let script = format!("window.scrollBy(0, {y}); true");
        let _: bool = self.eval(script).await?;
        Ok(())
    }

    async fn screenshot_to(&self, path: &Path, full_page: bool) -> Result<()> {
        self.page
            .save_screenshot(
                ScreenshotParams::builder().full_page(full_page).build(),
                path,
            )
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        Ok(())
    }

    async fn upload_file(&self, selector: &str, path: &Path) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        let params = SetFileInputFilesParams::builder()
            .file(path.display().to_string())
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(BrowserError::Engine)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| BrowserError::Engine(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if let Err(e) = self.page.clone().close().await {
            // A page torn down by the browser already counts as closed.
            tracing::debug!("page close reported: {e}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escaping() {
        assert_eq!(js_string("plain"), "\"plain\"");
        assert_eq!(js_string("with \"quotes\""), r#""with \"quotes\"""#);
        // A selector with embedded quotes must not break out of the script.
        let escaped = js_string("input[name='q']");
        assert!(escaped.starts_with('"') && escaped.ends_with('"'));
    }

    #[tokio::test]
    #[ignore = "Requires Chrome browser to be installed"]
    async fn test_engine_launch_and_session() {
        let config = hearth_core::config::BrowserConfig::default();
        let engine = BrowserEngine::launch(&config).await.expect("launch");
        let session = engine.new_session().await.expect("new session");
        session
            .navigate("about:blank")
            .await
            .expect("navigate to blank");
        session.close().await.expect("close");
    }
}
