//! Normalization helpers shared by the reconciler and the catalog importer.
//!
//! The CRM is permissive about formatting: phones arrive with spaces, dashes
//! and national prefixes mixed freely, and catalog exports carry prices like
//! "2 500 Kč" or warranties like "6 months". Matching and importing both
//! depend on the canonical forms produced here.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Czech country prefix, applied to bare 9-digit national numbers.
const DEFAULT_COUNTRY_PREFIX: &str = "+420";

/// Normalizes a phone number to `+<digits>` form.
///
/// Returns `None` when too few digits survive to plausibly be a phone
/// number; callers treat that as "no phone on record".
pub fn normalize_phone(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let has_plus = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 6 {
        return None;
    }

    if has_plus {
        return Some(format!("+{digits}"));
    }
    // "00" international prefix is equivalent to "+".
    if let Some(rest) = digits.strip_prefix("00") {
        return Some(format!("+{rest}"));
    }
    // Bare national numbers default to the Czech prefix.
    if digits.len() == 9 {
        return Some(format!("{DEFAULT_COUNTRY_PREFIX}{digits}"));
    }
    Some(format!("+{digits}"))
}

/// Permissive price parse: strips everything but digits and separators,
/// treats a comma as a decimal point. `None` when no digits remain at all.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Strips non-digits and parses; garbage silently becomes 0. This mirrors
/// how warranty/duration columns have always been handled.
pub fn parse_int_loose(raw: &str) -> i32 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
