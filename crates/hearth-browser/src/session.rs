//! Session step model and the driver that executes step lists.
//!
//! A flow is an ordered list of [`SessionStep`]s executed strictly in
//! declared order against one exclusively-owned surface. Element-addressing
//! steps carry a [`SelectorChain`]: an ordered list of selector candidates
//! tried in sequence under one bounded wait. The driver never retries a
//! failed step; a half-completed multi-step flow cannot be resumed safely,
//! so retries belong to the task layer, which re-runs the whole flow on a
//! fresh session.

use crate::consent::{dismiss_consent, ConsentRules};
use crate::error::{BrowserError, Result};
use crate::surface::SessionSurface;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

/// Cadence for re-probing selector candidates while a locate wait is open.
const PROBE_INTERVAL: Duration = Duration::from_millis(250);

/// Ordered selector candidates for one element.
///
/// Kept data-driven so portal quirks live in flow definitions, not in
/// branching driver logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorChain {
    /// Candidates in priority order; the first that resolves wins
    pub candidates: Vec<String>,
}

impl SelectorChain {
    /// Build a chain from any list of selector strings.
    #[must_use]
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// Single-candidate chain.
    #[must_use]
    pub fn single(selector: impl Into<String>) -> Self {
        Self {
            candidates: vec![selector.into()],
        }
    }

    /// Candidates joined for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        self.candidates.join(", ")
    }
}

/// One primitive automated-UI action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionStep {
    /// Load a URL and wait for the page to settle
    Navigate {
        /// Target URL
        url: String,
    },
    /// Scan for a consent banner and dismiss it if present; absence is fine
    DismissConsent,
    /// Resolve an element without interacting, to gate later steps
    Locate {
        /// Selector candidates
        target: SelectorChain,
    },
    /// Clear-then-set a field's value, dispatching an input notification
    Type {
        /// Selector candidates
        target: SelectorChain,
        /// Text to set
        text: String,
    },
    /// Click an element
    Click {
        /// Selector candidates
        target: SelectorChain,
    },
    /// Click the first interactive element whose text contains `text`
    /// (case-insensitive), waiting for one to appear
    ClickByText {
        /// Interactive-element scope selector (e.g. `"button, a"`)
        scope: String,
        /// Substring the element's text must contain
        text: String,
    },
    /// Press a key on an element (e.g. Enter to submit a search)
    PressKey {
        /// Selector candidates
        target: SelectorChain,
        /// Key name
        key: String,
    },
    /// Wait for an element to appear as a completion signal for the
    /// preceding action; `required` controls whether absence fails the flow
    WaitForSignal {
        /// Selector candidates
        target: SelectorChain,
        /// Whether absence after the wait is a step failure
        required: bool,
    },
    /// Named settle grace after a detected condition (never the sole
    /// synchronization mechanism in a flow)
    Settle {
        /// Grace duration in milliseconds
        millis: u64,
    },
    /// Scroll the viewport vertically
    ScrollBy {
        /// Pixel delta, positive scrolls down
        y: i64,
    },
    /// Capture a screenshot artifact
    Screenshot {
        /// Output path
        path: PathBuf,
        /// Capture the full page rather than the viewport
        full_page: bool,
    },
    /// Attach a local file to a file input
    UploadFile {
        /// Selector candidates for the input
        target: SelectorChain,
        /// File to attach
        path: PathBuf,
    },
}

impl SessionStep {
    /// Short description used in timeout errors and logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Navigate { url } => format!("navigate {url}"),
            Self::DismissConsent => "dismiss consent".to_string(),
            Self::Locate { target } => format!("locate {}", target.describe()),
            Self::Type { target, .. } => format!("type into {}", target.describe()),
            Self::Click { target } => format!("click {}", target.describe()),
            Self::ClickByText { scope, text } => format!("click `{text}` in {scope}"),
            Self::PressKey { target, key } => format!("press {key} on {}", target.describe()),
            Self::WaitForSignal { target, .. } => {
                format!("wait for {}", target.describe())
            }
            Self::Settle { millis } => format!("settle {millis}ms"),
            Self::ScrollBy { y } => format!("scroll by {y}"),
            Self::Screenshot { path, .. } => format!("screenshot to {}", path.display()),
            Self::UploadFile { target, .. } => format!("upload file to {}", target.describe()),
        }
    }
}

/// Executes step lists against one exclusively-owned surface.
pub struct SessionDriver {
    surface: Arc<dyn SessionSurface>,
    step_timeout: Duration,
    navigation_timeout: Duration,
    consent: ConsentRules,
}

impl SessionDriver {
    /// Create a driver over `surface` with uniform step timeouts.
    #[must_use]
    pub fn new(surface: Arc<dyn SessionSurface>, step_timeout: Duration) -> Self {
        Self {
            surface,
            step_timeout,
            navigation_timeout: step_timeout * 2,
            consent: ConsentRules::default(),
        }
    }

    /// Override the navigation timeout (defaults to twice the step timeout).
    #[must_use]
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    /// Override the consent dismissal rules.
    #[must_use]
    pub fn with_consent_rules(mut self, rules: ConsentRules) -> Self {
        self.consent = rules;
        self
    }

    /// The surface this driver owns.
    #[must_use]
    pub fn surface(&self) -> &Arc<dyn SessionSurface> {
        &self.surface
    }

    /// Execute `steps` strictly in declared order.
    ///
    /// The first failing step aborts the remainder of the flow and returns
    /// its error; nothing here retries.
    pub async fn run(&self, steps: &[SessionStep]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            tracing::debug!(step = %step.describe(), index, "executing step");
            self.exec(step).await.map_err(|e| {
                tracing::warn!(step = %step.describe(), error = %e, "step failed");
                e
            })?;
        }
        Ok(())
    }

    async fn exec(&self, step: &SessionStep) -> Result<()> {
        match step {
            SessionStep::Navigate { url } => {
                timeout(self.navigation_timeout, self.surface.navigate(url))
                    .await
                    .map_err(|_| BrowserError::NavigationTimeout {
                        url: url.clone(),
                        timeout_secs: self.navigation_timeout.as_secs(),
                    })?
            }
            SessionStep::DismissConsent => {
                let dismissed = self
                    .bounded_value(step, dismiss_consent(self.surface.as_ref(), &self.consent))
                    .await?;
                if dismissed {
                    tracing::debug!("consent banner dismissed");
                }
                Ok(())
            }
            SessionStep::Locate { target } => {
                self.resolve(target, self.step_timeout).await.map(|_| ())
            }
            SessionStep::Type { target, text } => {
                let selector = self.resolve(target, self.step_timeout).await?;
                self.bounded(step, self.surface.fill_field(&selector, text))
                    .await
            }
            SessionStep::Click { target } => {
                let selector = self.resolve(target, self.step_timeout).await?;
                self.bounded(step, self.surface.click(&selector)).await
            }
            SessionStep::ClickByText { scope, text } => self.click_by_text(scope, text).await,
            SessionStep::PressKey { target, key } => {
                let selector = self.resolve(target, self.step_timeout).await?;
                self.bounded(step, self.surface.press_key(&selector, key))
                    .await
            }
            SessionStep::WaitForSignal { target, required } => {
                match self.resolve(target, self.step_timeout).await {
                    Ok(_) => Ok(()),
                    Err(e @ BrowserError::ElementNotFound { .. }) if *required => Err(e),
                    Err(BrowserError::ElementNotFound { .. }) => {
                        tracing::debug!(
                            target = %target.describe(),
                            "optional signal never appeared, continuing"
                        );
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            SessionStep::Settle { millis } => {
                sleep(Duration::from_millis(*millis)).await;
                Ok(())
            }
            SessionStep::ScrollBy { y } => self.bounded(step, self.surface.scroll_by(*y)).await,
            SessionStep::Screenshot { path, full_page } => {
                self.bounded(step, self.surface.screenshot_to(path, *full_page))
                    .await
            }
            SessionStep::UploadFile { target, path } => {
                let selector = self.resolve(target, self.step_timeout).await?;
                self.bounded(step, self.surface.upload_file(&selector, path))
                    .await
            }
        }
    }

    /// Wait for an interactive element in `scope` whose text contains
    /// `text` (case-insensitive) and click it.
    async fn click_by_text(&self, scope: &str, text: &str) -> Result<()> {
        let needle = text.to_lowercase();
        let deadline = Instant::now() + self.step_timeout;
        loop {
            let texts = self.surface.element_texts(scope).await?;
            let matched = texts
                .iter()
                .find(|t| t.trim().to_lowercase().contains(&needle));
            if let Some(matched) = matched {
                if self.surface.click_by_text(scope, matched.trim()).await? {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::ElementNotFound {
                    selectors: format!("{scope} with text `{text}`"),
                });
            }
            sleep(PROBE_INTERVAL).await;
        }
    }

    /// Resolve a selector chain to the first candidate that is visible and
    /// interactable, probing in priority order until `wait` elapses.
    pub async fn resolve(&self, chain: &SelectorChain, wait: Duration) -> Result<String> {
        let deadline = Instant::now() + wait;
        loop {
            for candidate in &chain.candidates {
                if self.surface.is_present(candidate).await? {
                    return Ok(candidate.clone());
                }
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::ElementNotFound {
                    selectors: chain.describe(),
                });
            }
            sleep(PROBE_INTERVAL).await;
        }
    }

    async fn bounded<F>(&self, step: &SessionStep, fut: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        timeout(self.step_timeout, fut)
            .await
            .map_err(|_| BrowserError::StepTimeout {
                step: step.describe(),
                timeout_secs: self.step_timeout.as_secs(),
            })?
    }

    async fn bounded_value<F, T>(&self, step: &SessionStep, fut: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        timeout(self.step_timeout, fut)
            .await
            .map_err(|_| BrowserError::StepTimeout {
                step: step.describe(),
                timeout_secs: self.step_timeout.as_secs(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSurface;

    fn driver(surface: FakeSurface) -> SessionDriver {
        SessionDriver::new(Arc::new(surface), Duration::from_millis(600))
    }

    #[tokio::test]
    async fn test_steps_execute_in_order() {
        let surface = FakeSurface::new();
        surface.add_element("#search", "");
        let d = driver(surface.clone());

        let steps = vec![
            SessionStep::Navigate {
                url: "https://portal.example.com".to_string(),
            },
            SessionStep::Type {
                target: SelectorChain::single("#search"),
                text: "123 Main St".to_string(),
            },
            SessionStep::PressKey {
                target: SelectorChain::single("#search"),
                key: "Enter".to_string(),
            },
        ];
        d.run(&steps).await.expect("flow succeeds");

        let log = surface.log();
        assert_eq!(
            log,
            vec![
                "navigate https://portal.example.com",
                "fill #search=123 Main St",
                "press Enter on #search",
            ]
        );
    }

    #[tokio::test]
    async fn test_selector_fallback_order() {
        let surface = FakeSurface::new();
        // Only the second candidate exists.
        surface.add_element("input[name='q']", "");
        let d = driver(surface.clone());

        let resolved = d
            .resolve(
                &SelectorChain::new(["#missing", "input[name='q']"]),
                Duration::from_millis(300),
            )
            .await
            .expect("second candidate resolves");
        assert_eq!(resolved, "input[name='q']");
    }

    #[tokio::test]
    async fn test_element_not_found_after_exhaustion() {
        let surface = FakeSurface::new();
        let d = driver(surface);

        let err = d
            .resolve(
                &SelectorChain::new(["#a", "#b"]),
                Duration::from_millis(300),
            )
            .await
            .expect_err("nothing resolves");
        match err {
            BrowserError::ElementNotFound { selectors } => {
                assert!(selectors.contains("#a"));
                assert!(selectors.contains("#b"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_type_clears_then_sets_with_input_event() {
        let surface = FakeSurface::new();
        surface.add_element("#field", "stale text");
        let d = driver(surface.clone());

        d.run(&[SessionStep::Type {
            target: SelectorChain::single("#field"),
            text: "fresh".to_string(),
        }])
        .await
        .expect("type succeeds");

        assert_eq!(surface.value_of("#field").as_deref(), Some("fresh"));
        assert!(surface.input_event_fired("#field"));
    }

    #[tokio::test]
    async fn test_click_by_text_substring_match() {
        let surface = FakeSurface::new();
        surface.add_button("button", "Generate Analysis Now");
        let d = driver(surface.clone());

        d.run(&[SessionStep::ClickByText {
            scope: "button".to_string(),
            text: "generate analysis".to_string(),
        }])
        .await
        .expect("click by text succeeds");
        assert_eq!(surface.clicked_texts(), vec!["Generate Analysis Now"]);
    }

    #[tokio::test]
    async fn test_click_by_text_times_out_when_absent() {
        let surface = FakeSurface::new();
        let d = driver(surface);

        let err = d
            .run(&[SessionStep::ClickByText {
                scope: "button".to_string(),
                text: "launch".to_string(),
            }])
            .await
            .expect_err("no matching button");
        assert!(matches!(err, BrowserError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_optional_wait_for_signal_tolerates_absence() {
        let surface = FakeSurface::new();
        let d = driver(surface);

        d.run(&[SessionStep::WaitForSignal {
            target: SelectorChain::single(".results"),
            required: false,
        }])
        .await
        .expect("optional signal absence is not a failure");
    }

    #[tokio::test]
    async fn test_required_wait_for_signal_fails_on_absence() {
        let surface = FakeSurface::new();
        let d = driver(surface);

        let err = d
            .run(&[SessionStep::WaitForSignal {
                target: SelectorChain::single(".results"),
                required: true,
            }])
            .await
            .expect_err("required signal absence fails the flow");
        assert!(matches!(err, BrowserError::ElementNotFound { .. }));
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_steps() {
        let surface = FakeSurface::new();
        let d = driver(surface.clone());

        let result = d
            .run(&[
                SessionStep::Click {
                    target: SelectorChain::single("#gone"),
                },
                SessionStep::Navigate {
                    url: "https://never.example.com".to_string(),
                },
            ])
            .await;
        assert!(result.is_err());
        assert!(surface.log().is_empty(), "later steps must not run");
    }
}
