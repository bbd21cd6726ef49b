//! Fallback tiers used when the structured table is missing or too thin.
//!
//! Each tier is a plain function over the full response text. The ordering and
//! gating between them lives in `extract::run_chain`.

use std::collections::HashSet;

use crate::config::ParsePolicy;
use crate::extract::row::{clean_term, split_segments};
use crate::extract::volume::VolumeSource;
use crate::report::{KeywordRecord, Trend};

const PIPE_ONLY: [char; 1] = ['|'];
const LOOSE_DELIMITERS: [char; 2] = ['|', '-'];

fn is_non_trivial(segment: &str) -> bool {
    segment.chars().any(char::is_alphanumeric)
}

/// Tier 1: rescan every line of the response, splitting on `|` or `-`.
/// A line qualifies with at least two non-trivial segments and a usable first
/// segment. Trend, relevance and change are neutral; volume is drawn.
///
/// Lines that carry a pipe are split on the pipe alone, so a hyphenated term
/// in a table row stays whole.
pub fn loose_scan(
    text: &str,
    policy: &ParsePolicy,
    volumes: &mut dyn VolumeSource,
) -> Vec<KeywordRecord> {
    let mut out = Vec::new();
    for line in text.lines() {
        let delimiters: &[char] = if line.contains('|') {
            &PIPE_ONLY
        } else {
            &LOOSE_DELIMITERS
        };
        let segments: Vec<&str> = split_segments(line, delimiters)
            .into_iter()
            .filter(|s| is_non_trivial(s))
            .collect();
        if segments.len() < 2 {
            continue;
        }
        let Some(term) = clean_term(segments[0], policy) else {
            continue;
        };
        let volume = volumes.draw(policy.loose_volume);
        out.push(KeywordRecord::new(
            term,
            volume,
            Trend::Stable,
            0.0,
            policy.loose_relevance,
        ));
    }
    out
}

/// Tier 2: single-word keywords salvaged from long whitespace tokens.
pub fn salvage_tokens(text: &str, policy: &ParsePolicy) -> Vec<KeywordRecord> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for token in text.split_whitespace() {
        if out.len() >= policy.salvage_limit {
            break;
        }
        if token.chars().count() <= policy.salvage_min_token_len {
            continue;
        }
        let word: String = token.chars().filter(|c| c.is_alphabetic()).collect();
        if word.chars().count() <= 1 || policy.is_header_like(&word) {
            continue;
        }
        if !seen.insert(word.to_lowercase()) {
            continue;
        }
        let index = i32::try_from(out.len()).unwrap_or(i32::MAX);
        let relevance = 100i32.saturating_sub(index);
        out.push(KeywordRecord::new(
            word,
            policy.salvage_volume,
            Trend::Stable,
            0.0,
            relevance,
        ));
    }
    out
}

/// Tier 3: top the list up with preset keywords until `min_candidates` is met.
/// Terms already present (case-insensitive) are skipped. Returns how many were added.
pub fn top_up_curated(candidates: &mut Vec<KeywordRecord>, policy: &ParsePolicy) -> usize {
    let mut present: HashSet<String> = candidates.iter().map(|r| r.term().to_lowercase()).collect();
    let mut added = 0;
    for preset in &policy.curated {
        if candidates.len() >= policy.min_candidates {
            break;
        }
        if !present.insert(preset.term.to_lowercase()) {
            continue;
        }
        candidates.push(KeywordRecord::new(
            preset.term.clone(),
            preset.volume.max(1),
            preset.trend,
            preset.change_percent,
            policy.curated_relevance,
        ));
        added += 1;
    }
    added
}
