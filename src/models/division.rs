//! Division identity: the canonical form is an integer.
//!
//! Conversion table applied wherever a division enters from outside:
//!
//! | token       | division |
//! |-------------|----------|
//! | `"1"`, `1`  | 1        |
//! | `"A"`, `"a"`| 1        |
//! | `"B"`       | 2        |
//! | `"C"`       | 3        |
//!
//! Numeric tokens pass through; letters map by alphabetic offset of the
//! first letter.

use serde_json::Value;

/// Canonical division number.
pub type DivisionId = u32;

/// Map a division token (`"2"`, `"b"`, `"C"`) to its number.
///
/// Returns `None` for empty tokens, for `0`, for mixed tokens such as `2A`
/// and for tokens that start with neither a digit nor an ASCII letter. A
/// numeric token too large for `u32` saturates so it still compares above any
/// configured bound.
pub fn parse_division_token(token: &str) -> Option<DivisionId> {
    let token = token.trim();
    let first = token.chars().next()?;
    if token.chars().all(|c| c.is_ascii_digit()) {
        return Some(token.parse().unwrap_or(u32::MAX)).filter(|&n| n > 0);
    }
    if first.is_ascii_alphabetic() {
        let upper = first.to_ascii_uppercase();
        return Some(upper as u32 - 'A' as u32 + 1);
    }
    None
}

/// Lower-case letter for a division number (1 -> `a`), used in log lines and reports.
pub fn division_letter(division: DivisionId) -> Option<char> {
    if (1..=26).contains(&division) {
        char::from_u32('a' as u32 + division - 1)
    } else {
        None
    }
}

/// Read a stored division that may be a number, a numeric string or a letter.
pub fn division_from_value(value: &Value) -> Option<DivisionId> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|&n| n > 0),
        Value::String(s) => parse_division_token(s),
        _ => None,
    }
}
