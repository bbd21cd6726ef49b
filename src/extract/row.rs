//! Row parser: one line of a keyword table → `KeywordRecord`, or rejection.
//!
//! Total over any input. Bad numbers never reject a row: volume falls back to a
//! drawn placeholder and change to 0.0. Only the term decides acceptance.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::config::ParsePolicy;
use crate::extract::volume::VolumeSource;
use crate::report::{KeywordRecord, Trend};

pub const TABLE_DELIMITER: char = '|';

fn numbering_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"^\d+[.)](\s+|$)").expect("numbering regex"))
}

fn is_decoration(c: char) -> bool {
    c.is_whitespace() || matches!(c, '*' | '•' | '`' | '_')
}

/// Clean a candidate term: strip markdown emphasis, bullets and an ordinal
/// prefix ("3. ", "12) "). Returns `None` for anything that cannot be a keyword:
/// one char or less, no alphanumerics, or a header/section token.
pub fn clean_term(raw: &str, policy: &ParsePolicy) -> Option<String> {
    let stripped = raw.trim_matches(is_decoration);
    let stripped = numbering_re().replace(stripped, "");
    let term = stripped.trim_matches(is_decoration);

    if term.chars().count() <= 1 {
        return None;
    }
    if !term.chars().any(char::is_alphanumeric) {
        return None;
    }
    if policy.is_header_like(term) {
        return None;
    }
    Some(term.to_string())
}

/// Digits only, thousands separators and units dropped. Zero counts as missing.
pub fn parse_volume(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u64>().ok().filter(|v| *v > 0)
}

/// Signed percentage with `%` and any other decoration removed; 0.0 if unreadable.
pub fn parse_change(raw: &str) -> f64 {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
        .collect();
    kept.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Split on any of `delimiters` after dropping a single border delimiter on each
/// side (markdown tables), trimming each segment.
pub fn split_segments<'a>(line: &'a str, delimiters: &[char]) -> Vec<&'a str> {
    let mut body = line.trim();
    if let Some(rest) = body.strip_prefix(delimiters) {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix(delimiters) {
        body = rest;
    }
    body.split(delimiters).map(str::trim).collect()
}

/// Parse one pipe-delimited row. `accepted` is how many rows were accepted
/// before this one; it sets `relevance = 100 - accepted`.
pub fn parse_row(
    line: &str,
    accepted: usize,
    policy: &ParsePolicy,
    volumes: &mut dyn VolumeSource,
) -> Option<KeywordRecord> {
    let segments = split_segments(line, &[TABLE_DELIMITER]);
    if segments.len() < 3 {
        return None;
    }

    let term = clean_term(segments[0], policy)?;
    let volume = parse_volume(segments[1]).unwrap_or_else(|| volumes.draw(policy.structured_volume));
    let trend = Trend::classify(segments[2]);
    let change = segments.get(3).map(|s| parse_change(s)).unwrap_or(0.0);
    let relevance = 100i32.saturating_sub(i32::try_from(accepted).unwrap_or(i32::MAX));

    Some(KeywordRecord::new(term, volume, trend, change, relevance))
}
