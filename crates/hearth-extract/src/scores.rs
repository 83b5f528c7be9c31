//! Pattern-based extraction of risk scores from recognized text.
//!
//! Recognized text from a rendered risk panel is noisy: line breaks fall in
//! arbitrary places and sometimes every score lands on one visual line.
//! Extraction therefore runs two passes: a line-by-line keyword pass, then a
//! joined-text fallback for fields the first pass left unset. Fields that
//! never match stay `None`; partial extraction is a valid outcome, not an
//! error.

use hearth_core::DataDomain;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `N/10` score anywhere in a line.
static SCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)/10").expect("score regex is hardcoded and valid"));

/// Joined-text fallback: `N/10` immediately followed by a factor name token.
static SCORE_WITH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)/10\s+(Flood|Fire|Wind|Air|Heat)\s+Factor")
        .expect("factor regex is hardcoded and valid")
});

/// The five extracted risk scores, each as a `"N/10"` string or unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScores {
    /// Flood risk score
    pub flood: Option<String>,
    /// Fire risk score
    pub fire: Option<String>,
    /// Wind risk score
    pub wind: Option<String>,
    /// Air quality risk score
    pub air: Option<String>,
    /// Heat risk score
    pub heat: Option<String>,
}

impl RiskScores {
    /// Get the score for a risk-factor domain.
    ///
    /// Returns `None` for domains outside the risk-score schema.
    #[must_use]
    pub fn get(&self, domain: DataDomain) -> Option<&str> {
        match domain {
            DataDomain::FloodFactor => self.flood.as_deref(),
            DataDomain::FireFactor => self.fire.as_deref(),
            DataDomain::WindFactor => self.wind.as_deref(),
            DataDomain::AirFactor => self.air.as_deref(),
            DataDomain::HeatFactor => self.heat.as_deref(),
            _ => None,
        }
    }

    /// Number of fields that were successfully extracted.
    #[must_use]
    pub fn extracted_count(&self) -> usize {
        [&self.flood, &self.fire, &self.wind, &self.air, &self.heat]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }

    /// Whether any field at all was extracted.
    #[must_use]
    pub fn any(&self) -> bool {
        self.extracted_count() > 0
    }

    fn slot(&mut self, keyword: &str) -> Option<&mut Option<String>> {
        match keyword {
            "flood" => Some(&mut self.flood),
            "fire" => Some(&mut self.fire),
            "wind" => Some(&mut self.wind),
            "air" => Some(&mut self.air),
            "heat" => Some(&mut self.heat),
            _ => None,
        }
    }
}

const KEYWORDS: &[&str] = &["flood", "fire", "wind", "air", "heat"];

/// Extract risk scores from recognized text.
///
/// Pass 1 scans line by line: a line is attributed to a field when it
/// contains that field's keyword (case-insensitive) and exactly one `N/10`
/// score; the first matching line per field wins. Lines carrying several
/// scores are ambiguous and left alone. Pass 2 re-scans the whole text
/// joined to one line for `N/10 <Name> Factor` sequences, filling only
/// fields the first pass left unset.
#[must_use]
pub fn extract_risk_scores(text: &str) -> RiskScores {
    let mut scores = RiskScores::default();

    for line in text.lines() {
        let mut matches = SCORE.captures_iter(line);
        let Some(caps) = matches.next() else {
            continue;
        };
        if matches.next().is_some() {
            // Several scores on one line cannot be attributed per keyword.
            continue;
        }
        let value = format!("{}/10", &caps[1]);

        let lower = line.to_lowercase();
        for keyword in KEYWORDS {
            if !lower.contains(keyword) {
                continue;
            }
            let Some(slot) = scores.slot(keyword) else {
                continue;
            };
            if slot.is_none() {
                tracing::debug!(factor = keyword, score = %value, "line pass matched");
                *slot = Some(value.clone());
            }
        }
    }

    // Fallback for outputs where all factors share one visual line.
    let joined = text.replace('\n', " ");
    for caps in SCORE_WITH_NAME.captures_iter(&joined) {
        let keyword = caps[2].to_lowercase();
        let Some(slot) = scores.slot(&keyword) else {
            continue;
        };
        if slot.is_none() {
            let value = format!("{}/10", &caps[1]);
            tracing::debug!(factor = %keyword, score = %value, "joined pass matched");
            *slot = Some(value);
        }
    }

    tracing::debug!(extracted = scores.extracted_count(), "extraction finished");
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_pass_separate_lines() {
        let text = "Some header\n4/10 Flood Factor\n2/10 Fire Factor\nfooter";
        let scores = extract_risk_scores(text);
        assert_eq!(scores.flood.as_deref(), Some("4/10"));
        assert_eq!(scores.fire.as_deref(), Some("2/10"));
        assert_eq!(scores.wind, None);
        assert_eq!(scores.air, None);
        assert_eq!(scores.heat, None);
    }

    #[test]
    fn test_joined_fallback_single_line() {
        let text = "1/10 Fire Factor 2/10 Wind Factor 4/10 Air Factor 3/10 Heat Factor";
        let scores = extract_risk_scores(text);
        assert_eq!(scores.fire.as_deref(), Some("1/10"));
        assert_eq!(scores.wind.as_deref(), Some("2/10"));
        assert_eq!(scores.air.as_deref(), Some("4/10"));
        assert_eq!(scores.heat.as_deref(), Some("3/10"));
        assert_eq!(scores.flood, None);
    }

    #[test]
    fn test_first_line_match_wins() {
        let text = "Flood Factor 5/10\nflood again 9/10";
        let scores = extract_risk_scores(text);
        assert_eq!(scores.flood.as_deref(), Some("5/10"));
    }

    #[test]
    fn test_fallback_does_not_overwrite_line_pass() {
        // Line pass sets fire to 7; the joined pass must not replace it.
        let text = "fire risk 7/10\n1/10 Fire Factor 2/10 Wind Factor";
        let scores = extract_risk_scores(text);
        assert_eq!(scores.fire.as_deref(), Some("7/10"));
        assert_eq!(scores.wind.as_deref(), Some("2/10"));
    }

    #[test]
    fn test_no_scores_is_empty_not_error() {
        let scores = extract_risk_scores("nothing useful recognized here");
        assert!(!scores.any());
        assert_eq!(scores.extracted_count(), 0);
    }

    #[test]
    fn test_keyword_without_score_ignored() {
        let scores = extract_risk_scores("flood factor information unavailable");
        assert_eq!(scores.flood, None);
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let text = "FLOOD FACTOR 3/10\nHeat factor 8/10";
        let scores = extract_risk_scores(text);
        assert_eq!(scores.flood.as_deref(), Some("3/10"));
        assert_eq!(scores.heat.as_deref(), Some("8/10"));
    }

    #[test]
    fn test_domain_accessor() {
        let text = "4/10 Flood Factor";
        let scores = extract_risk_scores(text);
        assert_eq!(
            scores.get(hearth_core::DataDomain::FloodFactor),
            Some("4/10")
        );
        assert_eq!(scores.get(hearth_core::DataDomain::FireFactor), None);
        assert_eq!(scores.get(hearth_core::DataDomain::OffenderMap), None);
    }
}
