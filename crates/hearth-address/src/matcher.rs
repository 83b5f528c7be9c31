//! Variant-priority address matching against record store rows.
//!
//! The store is allowed to contain duplicate address rows; a match returns
//! every row whose normalized address equals the first variant that matches
//! anything, and callers apply the same field update to all of them. This
//! at-least-once, possibly-multi-row behavior is deliberate.

use crate::canonical::{normalize, variants};
use hearth_core::PropertyRow;
use serde::{Deserialize, Serialize};

/// Outcome of resolving a raw address against the record store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchResult {
    /// Every row matching the winning variant; empty when nothing matched
    pub rows: Vec<PropertyRow>,
    /// The variant that produced the match, if any
    pub matched_variant: Option<String>,
}

impl MatchResult {
    /// Whether at least one row matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        !self.rows.is_empty()
    }
}

/// Resolve `raw` to record store rows using ordered variant priority.
///
/// Variants are tried in the fixed order [`variants`] emits; for each, the
/// candidate rows are filtered by normalized equality and the first variant
/// yielding at least one row wins. Matching is deterministic: given two
/// record sets differing only in which variant they match, the earlier
/// variant's match is always returned.
#[must_use]
pub fn match_rows(raw: &str, records: &[PropertyRow]) -> MatchResult {
    for variant in variants(raw) {
        let wanted = normalize(&variant);
        let rows: Vec<PropertyRow> = records
            .iter()
            .filter(|row| normalize(&row.address) == wanted)
            .cloned()
            .collect();
        if !rows.is_empty() {
            tracing::debug!(
                variant = %variant,
                matches = rows.len(),
                "address variant matched"
            );
            return MatchResult {
                rows,
                matched_variant: Some(variant),
            };
        }
    }

    tracing::debug!(address = %raw, "no address variant matched");
    MatchResult::default()
}
