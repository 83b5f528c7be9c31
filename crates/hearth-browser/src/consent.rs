//! Consent/modal banner dismissal.
//!
//! Portals routinely interpose a cookie-consent banner before their search
//! UI is usable. Dismissal is a best-effort pre-step: scan for an
//! interactive element whose text matches a prioritized list of affirmative
//! phrases and click it. Exact text matches are preferred over substring
//! matches, and consent-scoped containers are searched before the whole
//! page. A page without any banner is the common case and not an error.

use crate::error::Result;
use crate::surface::SessionSurface;
use serde::{Deserialize, Serialize};

/// Phrase and scope configuration for banner dismissal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentRules {
    /// Affirmative phrases in priority order; broad "accept everything"
    /// wording outranks narrower variants like "Allow selection"
    pub phrases: Vec<String>,
    /// Container-scoped selectors searched before the page-wide scope
    pub container_scopes: Vec<String>,
    /// Page-wide interactive-element selector, searched last
    pub page_scope: String,
}

impl Default for ConsentRules {
    fn default() -> Self {
        Self {
            phrases: [
                "Allow all",
                "Allow All",
                "Accept All",
                "Accept all",
                "Accept All Cookies",
                "Accept & Continue",
                "I Accept All",
                "Accept",
                "Allow",
                "I Accept",
                "OK",
                "Got it",
                "Agree",
                "Continue",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            container_scopes: vec![
                "[id*='cookie'] button, [class*='cookie'] button".to_string(),
                "[id*='consent'] button, [class*='consent'] button".to_string(),
                "[id*='gdpr'] button, [class*='gdpr'] button".to_string(),
                "[id*='privacy'] button, [class*='privacy'] button".to_string(),
            ],
            page_scope: "button".to_string(),
        }
    }
}

impl ConsentRules {
    fn scopes(&self) -> impl Iterator<Item = &str> {
        self.container_scopes
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.page_scope.as_str()))
    }
}

/// Scan for and click a consent-affirmation element.
///
/// Returns whether anything was clicked. Never fails just because no banner
/// is present.
pub async fn dismiss_consent(surface: &dyn SessionSurface, rules: &ConsentRules) -> Result<bool> {
    for scope in rules.scopes() {
        let texts = surface.element_texts(scope).await?;
        if texts.is_empty() {
            continue;
        }

        // Exact matches first, in phrase priority order.
        for phrase in &rules.phrases {
            if texts.iter().any(|t| t.trim() == phrase.as_str())
                && surface.click_by_text(scope, phrase).await?
            {
                tracing::debug!(scope, phrase = %phrase, "consent dismissed (exact)");
                return Ok(true);
            }
        }

        // Then case-insensitive substring matches.
        for phrase in &rules.phrases {
            let needle = phrase.to_lowercase();
            if let Some(matched) = texts
                .iter()
                .find(|t| t.trim().to_lowercase().contains(&needle))
            {
                if surface.click_by_text(scope, matched.trim()).await? {
                    tracing::debug!(scope, text = %matched.trim(), "consent dismissed (substring)");
                    return Ok(true);
                }
            }
        }
    }

    tracing::debug!("no consent banner found");
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSurface;

    #[tokio::test]
    async fn test_no_banner_is_not_an_error() {
        let surface = FakeSurface::new();
        let dismissed = dismiss_consent(&surface, &ConsentRules::default())
            .await
            .expect("scan succeeds");
        assert!(!dismissed);
    }

    #[tokio::test]
    async fn test_exact_match_beats_substring() {
        let rules = ConsentRules::default();
        let surface = FakeSurface::new();
        // Both live page-wide; "Allow all" is an exact phrase and must win
        // over "Allow selection", which only substring-matches "Allow".
        surface.add_button("button", "Allow selection");
        surface.add_button("button", "Allow all");

        let dismissed = dismiss_consent(&surface, &rules).await.expect("scan");
        assert!(dismissed);
        assert_eq!(surface.clicked_texts(), vec!["Allow all"]);
    }

    #[tokio::test]
    async fn test_container_scope_searched_before_page() {
        let rules = ConsentRules::default();
        let surface = FakeSurface::new();
        surface.add_button("button", "Accept");
        surface.add_button(
            "[id*='cookie'] button, [class*='cookie'] button",
            "Accept All Cookies",
        );

        let dismissed = dismiss_consent(&surface, &rules).await.expect("scan");
        assert!(dismissed);
        assert_eq!(surface.clicked_texts(), vec!["Accept All Cookies"]);
    }

    #[tokio::test]
    async fn test_substring_fallback() {
        let rules = ConsentRules::default();
        let surface = FakeSurface::new();
        surface.add_button("button", "Yes, I accept the terms");

        let dismissed = dismiss_consent(&surface, &rules).await.expect("scan");
        assert!(dismissed);
        assert_eq!(surface.clicked_texts(), vec!["Yes, I accept the terms"]);
    }

    #[tokio::test]
    async fn test_phrase_priority_order() {
        let rules = ConsentRules::default();
        let surface = FakeSurface::new();
        surface.add_button("button", "Continue");
        surface.add_button("button", "Accept All");

        dismiss_consent(&surface, &rules).await.expect("scan");
        // "Accept All" is earlier in the phrase list than "Continue".
        assert_eq!(surface.clicked_texts(), vec!["Accept All"]);
    }
}
