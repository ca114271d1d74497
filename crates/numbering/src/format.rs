//! Document number formatting.

use chrono::{DateTime, Utc};

use billkit_core::DocumentKind;

use crate::fiscal::FinancialYear;

/// Stored prefix form: `"{prefix}/{year}/"`, or `"{year}/"` when the
/// resolved prefix is empty.
pub fn prefix_with_year(prefix: &str, year: &FinancialYear) -> String {
    if prefix.is_empty() {
        format!("{year}/")
    } else {
        format!("{prefix}/{year}/")
    }
}

/// Zero-pad a counter value to `padding` digits.
///
/// Values wider than the padding are never truncated.
pub fn format_padded(number: u64, padding: usize) -> String {
    format!("{number:0padding$}")
}

/// Degraded-mode document number: `"{SHORT_CODE}-{epoch_millis}"`.
///
/// Handed out when allocation cannot reach storage (or has no company to
/// scope a counter to). Not sequence-backed; callers must treat numbers of
/// this shape as provisional and reconcile later.
pub fn fallback_number(kind: &DocumentKind, now: DateTime<Utc>) -> String {
    format!("{}-{}", kind.short_code(), now.timestamp_millis())
}
