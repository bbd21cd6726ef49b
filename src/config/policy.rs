// src/config/policy.rs
//! Parse policy: marker vocabulary, active fallback tiers, volume ranges and thresholds.
//!
//! Every historical variant of the response pipeline is a value of this struct rather
//! than a separate code path. Files may be TOML or JSON and may be partial; missing
//! fields take the value of the preset chosen by `mode`.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::report::Trend;

pub const ENV_PARSE_POLICY_PATH: &str = "PARSE_POLICY_PATH";
pub const DEFAULT_SUMMARY_PLACEHOLDER: &str = "No summary was provided for this analysis.";
/// Hard ceiling on report size; `max_keywords` can only lower it.
pub const MAX_KEYWORDS: usize = 50;

/// Section markers recognized in model output. Matching is case-insensitive.
/// The first entry of each list is the canonical spelling used in prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerVocabulary {
    pub summary: Vec<String>,
    pub table: Vec<String>,
    pub table_end: Vec<String>,
}

impl Default for MarkerVocabulary {
    fn default() -> Self {
        Self {
            summary: vec!["SUMMARY:".into()],
            table: vec!["DATA_TABLE:".into(), "DATA:".into(), "KEYWORDS_START".into()],
            table_end: vec!["KEYWORDS_END".into(), "END_DATA_TABLE".into()],
        }
    }
}

impl MarkerVocabulary {
    pub fn canonical_summary(&self) -> &str {
        self.summary.first().map(String::as_str).unwrap_or("SUMMARY:")
    }

    pub fn canonical_table(&self) -> &str {
        self.table.first().map(String::as_str).unwrap_or("DATA_TABLE:")
    }

    pub fn canonical_table_end(&self) -> &str {
        self.table_end.first().map(String::as_str).unwrap_or("KEYWORDS_END")
    }
}

/// Which fallback tiers run after the structured table parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierSet {
    pub loose_delimiter: bool,
    pub token_salvage: bool,
    pub curated: bool,
}

impl Default for TierSet {
    fn default() -> Self {
        Self {
            loose_delimiter: true,
            token_salvage: true,
            curated: true,
        }
    }
}

/// Inclusive bounds for placeholder volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRange {
    pub min: u64,
    pub max: u64,
}

impl VolumeRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// Bounds in ascending order with `min >= 1`, so draws are always positive.
    pub fn normalized(self) -> Self {
        let lo = self.min.min(self.max).max(1);
        let hi = self.min.max(self.max).max(lo);
        Self { min: lo, max: hi }
    }

    pub fn contains(&self, v: u64) -> bool {
        let r = self.normalized();
        (r.min..=r.max).contains(&v)
    }
}

/// A preset keyword injected by the curated tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuratedKeyword {
    pub term: String,
    pub volume: u64,
    pub trend: Trend,
    pub change_percent: f64,
}

impl CuratedKeyword {
    fn new(term: &str, volume: u64, trend: Trend, change_percent: f64) -> Self {
        Self {
            term: term.to_string(),
            volume,
            trend,
            change_percent,
        }
    }
}

fn default_curated() -> Vec<CuratedKeyword> {
    vec![
        CuratedKeyword::new("Industry trends", 12_000, Trend::Up, 8.0),
        CuratedKeyword::new("Best practices", 9_500, Trend::Stable, 2.0),
        CuratedKeyword::new("Beginner guide", 8_800, Trend::Up, 12.0),
        CuratedKeyword::new("Online courses", 7_600, Trend::Up, 15.0),
        CuratedKeyword::new("Certification", 6_400, Trend::Stable, 1.5),
        CuratedKeyword::new("Tools and software", 5_900, Trend::Up, 6.0),
        CuratedKeyword::new("Career opportunities", 5_200, Trend::Stable, 0.0),
        CuratedKeyword::new("Salary insights", 4_700, Trend::Down, -2.0),
    ]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    /// All tiers, curated keywords top up short lists.
    #[default]
    Lenient,
    /// No curated tier: an empty extraction is reported as a failure.
    Strict,
}

/// Full policy object. See module docs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsePolicy {
    pub mode: PolicyMode,
    pub markers: MarkerVocabulary,
    pub tiers: TierSet,
    /// Tokens that mark a header or section line, matched as case-insensitive substrings.
    pub header_tokens: Vec<String>,
    pub structured_volume: VolumeRange,
    pub loose_volume: VolumeRange,
    pub salvage_volume: u64,
    /// Tier 1 runs when tier 0 produced fewer rows than this.
    pub loose_threshold: usize,
    /// Curated tier tops the list up to this many rows.
    pub min_candidates: usize,
    pub max_keywords: usize,
    pub salvage_limit: usize,
    /// Tier 2 keeps whitespace tokens strictly longer than this.
    pub salvage_min_token_len: usize,
    pub loose_relevance: i32,
    pub curated_relevance: i32,
    pub curated: Vec<CuratedKeyword>,
    pub summary_placeholder: String,
}

impl Default for ParsePolicy {
    fn default() -> Self {
        Self::lenient()
    }
}

impl ParsePolicy {
    pub fn lenient() -> Self {
        Self {
            mode: PolicyMode::Lenient,
            markers: MarkerVocabulary::default(),
            tiers: TierSet::default(),
            header_tokens: ["term", "keyword", "summary", "data"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            structured_volume: VolumeRange::new(1_000, 50_000),
            loose_volume: VolumeRange::new(500, 10_000),
            salvage_volume: 1_000,
            loose_threshold: 5,
            min_candidates: 5,
            max_keywords: MAX_KEYWORDS,
            salvage_limit: 10,
            salvage_min_token_len: 5,
            loose_relevance: 50,
            curated_relevance: 10,
            curated: default_curated(),
            summary_placeholder: DEFAULT_SUMMARY_PLACEHOLDER.to_string(),
        }
    }

    pub fn strict() -> Self {
        Self {
            mode: PolicyMode::Strict,
            tiers: TierSet {
                curated: false,
                ..TierSet::default()
            },
            ..Self::lenient()
        }
    }

    pub fn for_mode(mode: PolicyMode) -> Self {
        match mode {
            PolicyMode::Lenient => Self::lenient(),
            PolicyMode::Strict => Self::strict(),
        }
    }

    /// True when `text` contains any header token (case-insensitive).
    pub fn is_header_like(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.header_tokens
            .iter()
            .any(|t| !t.is_empty() && lower.contains(&t.to_lowercase()))
    }

    /// Effective report size: `max_keywords` bounded to `1..=MAX_KEYWORDS`.
    pub fn keyword_cap(&self) -> usize {
        self.max_keywords.clamp(1, MAX_KEYWORDS)
    }

    /// Clamp values that would make the chain misbehave (empty ranges, zero caps).
    fn sanitized(mut self) -> Self {
        self.structured_volume = self.structured_volume.normalized();
        self.loose_volume = self.loose_volume.normalized();
        self.salvage_volume = self.salvage_volume.max(1);
        if self.max_keywords == 0 {
            self.max_keywords = MAX_KEYWORDS;
        }
        self.max_keywords = self.max_keywords.min(MAX_KEYWORDS);
        if self.summary_placeholder.trim().is_empty() {
            self.summary_placeholder = DEFAULT_SUMMARY_PLACEHOLDER.to_string();
        }
        self
    }
}

/// Every field optional: overrides applied on top of the preset for `mode`.
#[derive(Debug, Default, Deserialize)]
struct PolicyOverrides {
    mode: Option<PolicyMode>,
    markers: Option<MarkerVocabulary>,
    tiers: Option<TierSet>,
    header_tokens: Option<Vec<String>>,
    structured_volume: Option<VolumeRange>,
    loose_volume: Option<VolumeRange>,
    salvage_volume: Option<u64>,
    loose_threshold: Option<usize>,
    min_candidates: Option<usize>,
    max_keywords: Option<usize>,
    salvage_limit: Option<usize>,
    salvage_min_token_len: Option<usize>,
    loose_relevance: Option<i32>,
    curated_relevance: Option<i32>,
    curated: Option<Vec<CuratedKeyword>>,
    summary_placeholder: Option<String>,
}

impl PolicyOverrides {
    fn apply(self) -> ParsePolicy {
        let mut p = ParsePolicy::for_mode(self.mode.unwrap_or_default());
        if let Some(v) = self.markers {
            p.markers = v;
        }
        if let Some(v) = self.tiers {
            p.tiers = v;
        }
        if let Some(v) = self.header_tokens {
            p.header_tokens = v;
        }
        if let Some(v) = self.structured_volume {
            p.structured_volume = v;
        }
        if let Some(v) = self.loose_volume {
            p.loose_volume = v;
        }
        if let Some(v) = self.salvage_volume {
            p.salvage_volume = v;
        }
        if let Some(v) = self.loose_threshold {
            p.loose_threshold = v;
        }
        if let Some(v) = self.min_candidates {
            p.min_candidates = v;
        }
        if let Some(v) = self.max_keywords {
            p.max_keywords = v;
        }
        if let Some(v) = self.salvage_limit {
            p.salvage_limit = v;
        }
        if let Some(v) = self.salvage_min_token_len {
            p.salvage_min_token_len = v;
        }
        if let Some(v) = self.loose_relevance {
            p.loose_relevance = v;
        }
        if let Some(v) = self.curated_relevance {
            p.curated_relevance = v;
        }
        if let Some(v) = self.curated {
            p.curated = v;
        }
        if let Some(v) = self.summary_placeholder {
            p.summary_placeholder = v;
        }
        p.sanitized()
    }
}

/// Load a policy from an explicit path. Supports TOML or JSON formats.
pub fn load_policy_from(path: &Path) -> Result<ParsePolicy> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading parse policy from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_policy(&content, ext.as_str())
        .with_context(|| format!("parsing parse policy {}", path.display()))
}

/// Load the policy using env var + fallbacks:
/// 1) $PARSE_POLICY_PATH
/// 2) config/parse_policy.toml
/// 3) config/parse_policy.json
/// 4) built-in lenient preset
pub fn load_policy_default() -> Result<ParsePolicy> {
    if let Ok(p) = std::env::var(ENV_PARSE_POLICY_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_policy_from(&pb);
        } else {
            return Err(anyhow!("PARSE_POLICY_PATH points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/parse_policy.toml");
    if toml_p.exists() {
        return load_policy_from(&toml_p);
    }
    let json_p = PathBuf::from("config/parse_policy.json");
    if json_p.exists() {
        return load_policy_from(&json_p);
    }
    Ok(ParsePolicy::default())
}

fn parse_policy(s: &str, hint_ext: &str) -> Result<ParsePolicy> {
    if hint_ext == "json" || s.trim_start().starts_with('{') {
        let o: PolicyOverrides = serde_json::from_str(s)?;
        return Ok(o.apply());
    }
    let o: PolicyOverrides = toml::from_str(s)?;
    Ok(o.apply())
}
