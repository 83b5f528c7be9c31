//! Error types for session driving.

use thiserror::Error;

/// Errors from the automated session driver and its engine.
#[derive(Error, Debug)]
pub enum BrowserError {
    /// No selector candidate resolved to a visible, interactable element
    #[error("element not found after trying selectors: {selectors}")]
    ElementNotFound {
        /// The candidate list that was exhausted, joined for display
        selectors: String,
    },

    /// Navigation did not complete within its timeout
    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout {
        /// Target URL
        url: String,
        /// Timeout that elapsed
        timeout_secs: u64,
    },

    /// A non-navigation step exceeded its timeout
    #[error("step `{step}` timed out after {timeout_secs}s")]
    StepTimeout {
        /// Short description of the step
        step: String,
        /// Timeout that elapsed
        timeout_secs: u64,
    },

    /// Underlying automation engine failure
    #[error("automation engine error: {0}")]
    Engine(String),

    /// Malformed URL handed to a navigate step
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias using `BrowserError`.
pub type Result<T> = std::result::Result<T, BrowserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_found_display() {
        let err = BrowserError::ElementNotFound {
            selectors: "#search, input[type='text']".to_string(),
        };
        assert!(err.to_string().contains("#search"));
    }

    #[test]
    fn test_timeout_display() {
        let err = BrowserError::StepTimeout {
            step: "click #submit".to_string(),
            timeout_secs: 30,
        };
        assert!(err.to_string().contains("30s"));
    }
}
