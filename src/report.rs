//! report.rs — Shapes returned to callers: keyword records, citations and the final report.
//!
//! Records are immutable once built: fields are private and read through accessors,
//! so a record that passed validation in the row parser stays valid.

use serde::{Deserialize, Serialize};

/// Placeholder title for citations that arrive without one.
pub const UNTITLED_SOURCE: &str = "Untitled source";
/// Placeholder link for citations that arrive without a URI.
pub const MISSING_URI: &str = "#";

/// Direction of interest for a keyword over the last year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    /// Classify free text: anything containing "up" is Up, anything containing
    /// "down" is Down, everything else is Stable. Never fails.
    pub fn classify(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("up") {
            Trend::Up
        } else if lower.contains("down") {
            Trend::Down
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        }
    }
}

/// One ranked keyword in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRecord {
    term: String,
    volume: u64,
    trend: Trend,
    change_percent: f64,
    relevance: i32,
}

impl KeywordRecord {
    /// Callers are expected to pass an already validated term (see `extract::row`).
    pub(crate) fn new(
        term: impl Into<String>,
        volume: u64,
        trend: Trend,
        change_percent: f64,
        relevance: i32,
    ) -> Self {
        Self {
            term: term.into(),
            volume,
            trend,
            change_percent,
            relevance,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    pub fn change_percent(&self) -> f64 {
        self.change_percent
    }

    pub fn relevance(&self) -> i32 {
        self.relevance
    }
}

/// Grounding citation attached to a report. Display/attribution only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

impl Source {
    /// Normalize a citation at the upstream boundary: blank or missing
    /// fields fall back to fixed placeholders.
    pub fn from_parts(title: Option<&str>, uri: Option<&str>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED_SOURCE);
        let uri = uri
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(MISSING_URI);
        Self {
            title: title.to_string(),
            uri: uri.to_string(),
        }
    }
}

/// Which stage of the fallback chain produced the keyword list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Structured,
    LooseDelimiter,
    TokenSalvage,
    Curated,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Structured => "structured",
            Tier::LooseDelimiter => "loose_delimiter",
            Tier::TokenSalvage => "token_salvage",
            Tier::Curated => "curated",
        }
    }
}

/// Final report handed to the presentation layer.
///
/// `keywords` holds at most the policy's `keyword_cap()` entries (never above 50), sorted by
/// volume descending with ties in extraction order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketReport {
    pub subject: String,
    pub summary: String,
    pub keywords: Vec<KeywordRecord>,
    pub sources: Vec<Source>,
    pub generated_at: String,
    pub tier: Tier,
}
