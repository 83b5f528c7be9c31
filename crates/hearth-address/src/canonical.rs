//! Address canonicalization and variant generation.
//!
//! Matching against the record store never trusts raw strings: every
//! comparison goes through [`normalize`], and lookups try the ordered
//! variant set from [`variants`] so records keyed with abbreviated or
//! expanded street suffixes still resolve.

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing postal code: a 5-digit run, optionally `-nnnn`, at end of string.
static TRAILING_ZIP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+(\d{5}(-\d{4})?)\s*$").expect("zip regex is hardcoded and valid")
});

/// Runs of whitespace, collapsed to a single space during normalization.
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is hardcoded and valid"));

/// Street suffix abbreviation/expansion pairs, applied on token boundaries.
///
/// Both directions are listed so an abbreviated query can match an expanded
/// record and vice versa.
const SUFFIX_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("Ave", "Avenue"),
    ("Avenue", "Ave"),
    ("St", "Street"),
    ("Street", "St"),
    ("Rd", "Road"),
    ("Road", "Rd"),
    ("Dr", "Drive"),
    ("Drive", "Dr"),
    ("Ln", "Lane"),
    ("Lane", "Ln"),
    ("Blvd", "Boulevard"),
    ("Boulevard", "Blvd"),
    ("Ct", "Court"),
    ("Court", "Ct"),
    ("Pl", "Place"),
    ("Place", "Pl"),
    ("Cir", "Circle"),
    ("Circle", "Cir"),
];

/// Normalize an address string into its canonical matching key.
///
/// Strips commas, collapses whitespace, trims, and lowercases. Pure and
/// idempotent: `normalize(normalize(x)) == normalize(x)` for any input.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let no_commas = raw.replace(',', "");
    WHITESPACE
        .replace_all(&no_commas, " ")
        .trim()
        .to_lowercase()
}

/// Generate the ordered, deduplicated set of lookup variants for an address.
///
/// Priority order is fixed: the raw string, the trimmed string, street-suffix
/// substitutions (token-boundary only), comma-stripped and comma-respaced
/// forms, a zip-stripped form when a trailing postal code is detected, and
/// finally the fully normalized form. The result is never empty and always
/// contains both the raw and normalized strings.
#[must_use]
pub fn variants(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |candidate: String, out: &mut Vec<String>| {
        if !candidate.is_empty() && !out.contains(&candidate) {
            out.push(candidate);
        }
    };

    push(raw.to_string(), &mut out);
    push(raw.trim().to_string(), &mut out);

    // Suffix substitutions only fire on a token boundary: the suffix must
    // appear as a standalone word followed by a space or comma.
    for (from, to) in SUFFIX_SUBSTITUTIONS {
        let mid = format!(" {from} ");
        let before_comma = format!(" {from},");
        if raw.contains(&mid) {
            push(raw.replacen(&mid, &format!(" {to} "), 1), &mut out);
        }
        if raw.contains(&before_comma) {
            push(raw.replacen(&before_comma, &format!(" {to},"), 1), &mut out);
        }
    }

    push(raw.replace(',', ""), &mut out);
    push(respace_commas(raw), &mut out);

    if let Some(m) = TRAILING_ZIP.find(raw) {
        push(raw[..m.start()].trim_end().to_string(), &mut out);
    }

    push(normalize(raw), &mut out);

    out
}

/// Rewrite `", "`-style separators to a single comma followed by one space.
fn respace_commas(raw: &str) -> String {
    static COMMA_SPACING: Lazy<Regex> =
        Lazy::new(|| Regex::new(r",\s*").expect("comma regex is hardcoded and valid"));
    COMMA_SPACING.replace_all(raw, ", ").to_string()
}

/// Split a full address into its street portion and trailing zip code.
///
/// The zip is detected by the same trailing digit-run pattern the variant
/// generator uses; when none is present the whole string is returned as the
/// street portion and the zip is empty.
#[must_use]
pub fn split_street_zip(full: &str) -> (String, String) {
    if let Some(caps) = TRAILING_ZIP.captures(full) {
        let zip = caps
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let street = full[..caps.get(0).map_or(full.len(), |m| m.start())]
            .trim_end()
            .trim_end_matches(',')
            .trim_end()
            .to_string();
        if street.is_empty() {
            (full.trim().to_string(), zip)
        } else {
            (street, zip)
        }
    } else {
        (full.trim().to_string(), String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_commas_and_case() {
        assert_eq!(
            normalize("123 Main St, Springfield,  IL 62704"),
            "123 main st springfield il 62704"
        );
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            "123 Main St, Springfield, IL 62704",
            "  987   ELM  AVENUE ,, Metropolis ",
            "",
            "no digits here",
        ];
        for raw in inputs {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_variants_contains_raw_and_normalized() {
        let raw = "123 Main St, Springfield, IL 62704";
        let set = variants(raw);
        assert!(!set.is_empty());
        assert!(set.contains(&raw.to_string()));
        assert!(set.contains(&normalize(raw)));
    }

    #[test]
    fn test_variants_order_stable_and_deduplicated() {
        let raw = "123 Main St, Springfield, IL 62704";
        let first = variants(raw);
        let second = variants(raw);
        assert_eq!(first, second);

        let mut seen = std::collections::HashSet::new();
        for v in &first {
            assert!(seen.insert(v.clone()), "duplicate variant: {v}");
        }
        // Raw comes first: callers depend on priority order.
        assert_eq!(first[0], raw);
    }

    #[test]
    fn test_variants_suffix_substitution_on_token_boundary() {
        let set = variants("123 Main St, Springfield, IL 62704");
        assert!(set.contains(&"123 Main Street, Springfield, IL 62704".to_string()));

        // "St" inside a word must not be rewritten.
        let set = variants("9 Stone Way 53703");
        assert!(!set.iter().any(|v| v.contains("Streetone")));
    }

    #[test]
    fn test_variants_zip_stripped() {
        let set = variants("123 Main St, Springfield, IL 62704");
        assert!(set.contains(&"123 Main St, Springfield, IL".to_string()));

        let set = variants("123 Main St, Springfield, IL 62704-1234");
        assert!(set.contains(&"123 Main St, Springfield, IL".to_string()));
    }

    #[test]
    fn test_variants_no_zip_no_strip() {
        let set = variants("123 Main St, Springfield");
        assert!(!set.iter().any(String::is_empty));
    }

    #[test]
    fn test_split_street_zip() {
        let (street, zip) = split_street_zip("123 Main St, Springfield, IL 62704");
        assert_eq!(street, "123 Main St, Springfield, IL");
        assert_eq!(zip, "62704");

        let (street, zip) = split_street_zip("123 Main St, Springfield");
        assert_eq!(street, "123 Main St, Springfield");
        assert_eq!(zip, "");

        let (street, zip) = split_street_zip("444 Oak Dr, Madison, WI 53703-2210");
        assert_eq!(street, "444 Oak Dr, Madison, WI");
        assert_eq!(zip, "53703-2210");
    }
}
