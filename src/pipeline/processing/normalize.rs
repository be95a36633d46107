//! Lenient parsers for scraped count and rating fields.
//!
//! Scraped counts show up as `1234`, `"1,2 K"`, `(350)`, `2,5N` and similar.
//! Comma is a decimal separator, and a trailing `K` or `N` (nghìn) means
//! thousands.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::types::FieldValue;

static COUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(?([\d,.]+)([A-Za-z\s]*)\)?").expect("count pattern is valid"));

/// Parse a count field into a non-negative float.
///
/// Text that matches no number falls back to `0.0` with a warning instead of
/// an error, so malformed rows still flow through cleaning.
pub fn normalize_count(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Missing => 0.0,
        FieldValue::Number(n) => finite_abs(*n),
        FieldValue::Text(raw) => parse_count_text(raw),
    }
}

fn parse_count_text(raw: &str) -> f64 {
    let cleaned = raw.replace('"', "");
    let cleaned = cleaned.trim();

    if let Ok(n) = cleaned.parse::<f64>() {
        return finite_abs(n);
    }

    let Some(captures) = COUNT_PATTERN.captures(cleaned) else {
        warn!(value = %raw, "check again pattern: count has no numeric part");
        return 0.0;
    };

    let number = captures[1].replace(',', ".");
    let suffix = captures.get(2).map(|m| m.as_str().trim()).unwrap_or("");

    match number.parse::<f64>() {
        Ok(n) if is_thousands_suffix(suffix) => n * 1000.0,
        Ok(n) => n,
        Err(_) => {
            warn!(value = %raw, number = %number, "count numeric part is not a float");
            0.0
        }
    }
}

fn is_thousands_suffix(suffix: &str) -> bool {
    suffix.eq_ignore_ascii_case("k") || suffix.eq_ignore_ascii_case("n")
}

fn finite_abs(n: f64) -> f64 {
    if n.is_finite() {
        n.abs()
    } else {
        0.0
    }
}

/// Parse a rating field. Comma decimals are accepted; anything unparseable
/// is `0.0`.
pub fn normalize_rating(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Missing => 0.0,
        FieldValue::Number(n) if n.is_nan() => 0.0,
        FieldValue::Number(n) => *n,
        FieldValue::Text(raw) => {
            let cleaned = raw.replace(',', ".").replace('"', "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return 0.0;
            }
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|n| !n.is_nan())
                .unwrap_or(0.0)
        }
    }
}
