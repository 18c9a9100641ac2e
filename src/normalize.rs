//! Character-level canonicalization of numeric text.
//!
//! Exported sensor logs mix comma decimal separators with a family of
//! Unicode dash code points that look like a minus sign but are rejected by
//! `str::parse::<f64>`. This rewrite makes such fragments parseable with a
//! culture-invariant float parser. It is a pure character-by-character
//! substitution with no failure case.

/// Rewrites Unicode dash/minus variants (U+2010..U+2015, U+2212) to the
/// ASCII hyphen-minus and the comma decimal separator to a period. All
/// other characters pass through unchanged; idempotent.
pub fn normalize_numeric(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
            ',' => '.',
            other => other,
        })
        .collect()
}
