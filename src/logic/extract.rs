//! Pull the `newt=<document>;` assignment out of a served `tourney.js`.

use crate::models::{SyncError, TournamentDocument};
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

/// Characters of context shown either side of a parse failure.
const CONTEXT_CHARS: usize = 40;

fn newt_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bnewt\s*=\s*").expect("valid marker pattern"))
}

/// A string literal or a bare `undefined`; literals are matched so their contents are skipped.
fn literal_or_undefined() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""(?:[^"\\]|\\.)*"|\bundefined\b"#).expect("valid undefined pattern")
    })
}

/// Locate the assignment, repair it into JSON and parse it.
///
/// Repair is limited to dropping one trailing semicolon (plus surrounding
/// trailing whitespace) and replacing every bare `undefined` with `null`.
/// Text inside string literals is never touched.
pub fn extract_newt(js: &str) -> Result<Value, SyncError> {
    let marker = newt_marker().find(js).ok_or(SyncError::MarkerNotFound)?;
    let body = js[marker.end()..].trim_end();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();
    let repaired = literal_or_undefined().replace_all(body, |caps: &Captures| {
        let token = &caps[0];
        if token.starts_with('"') {
            token.to_string()
        } else {
            "null".to_string()
        }
    });

    serde_json::from_str(&repaired).map_err(|e| {
        let context = context_around(&repaired, e.line(), e.column());
        log::error!("Failed to parse tournament JSON near `{}`: {}", context, e);
        SyncError::MalformedDocument {
            message: e.to_string(),
            context,
        }
    })
}

/// Extract and convert into the typed document.
pub fn parse_tournament(js: &str) -> Result<TournamentDocument, SyncError> {
    let value = extract_newt(js)?;
    serde_json::from_value(value).map_err(|e| SyncError::MalformedDocument {
        message: e.to_string(),
        context: String::new(),
    })
}

/// Text surrounding a 1-based line/column position reported by serde_json.
fn context_around(text: &str, line: usize, column: usize) -> String {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let offset = (line_start + column.saturating_sub(1)).min(text.len());

    let mut start = offset.saturating_sub(CONTEXT_CHARS);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (offset + CONTEXT_CHARS).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].to_string()
}
