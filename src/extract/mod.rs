// src/extract/mod.rs
//! Response parsing pipeline: field extractors → table parser → fallback chain.
//!
//! Order of tiers (each runs at most once):
//! 0) structured table from the data section
//! 1) loose `|`/`-` rescan of the whole response, when tier 0 is below `loose_threshold`
//! 2) token salvage, when tiers 0 and 1 both found nothing
//! 3) curated top-up to `min_candidates` (lenient policies only)
//!
//! Zero candidates after the enabled tiers is an `ExtractionFailure`.

pub mod assemble;
pub mod fallback;
pub mod fields;
pub mod row;
pub mod table;
pub mod volume;

use std::collections::HashSet;

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::config::ParsePolicy;
use crate::error::AnalysisError;
use crate::report::{KeywordRecord, Tier};

pub use assemble::{assemble_report, format_generated_at};
pub use fields::{extract_summary, extract_table_part};
pub use row::parse_row;
pub use table::parse_table;
pub use volume::{FixedVolume, RandomVolumes, VolumeSource};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "extract_tier_total",
            "Extractions by the tier that produced the final keyword list."
        );
        describe_counter!(
            "extract_failures_total",
            "Responses where every enabled tier found nothing."
        );
    });
}

/// Candidate list plus the tier it came from. Internal to one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub candidates: Vec<KeywordRecord>,
    pub tier: Tier,
}

impl ParseOutcome {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Append rows whose term (case-insensitive) is not already present.
    fn merge_new_terms(&mut self, rows: Vec<KeywordRecord>) -> usize {
        let mut present: HashSet<String> =
            self.candidates.iter().map(|r| r.term().to_lowercase()).collect();
        let before = self.candidates.len();
        for r in rows {
            if present.insert(r.term().to_lowercase()) {
                self.candidates.push(r);
            }
        }
        self.candidates.len() - before
    }
}

/// Run the tier chain over one response. `text` is the whole response;
/// the structured tier only looks at its data section.
pub fn run_chain(
    text: &str,
    policy: &ParsePolicy,
    volumes: &mut dyn VolumeSource,
) -> Result<ParseOutcome, AnalysisError> {
    ensure_metrics_described();

    let table_part = extract_table_part(text, &policy.markers);
    let mut outcome = ParseOutcome {
        candidates: parse_table(table_part, policy, volumes),
        tier: Tier::Structured,
    };
    let structured = outcome.len();
    debug!(
        target: "extract",
        section_found = table_part.is_some(),
        rows = structured,
        "tier 0 structured"
    );

    let mut loose = 0;
    if policy.tiers.loose_delimiter && structured < policy.loose_threshold {
        let rows = fallback::loose_scan(text, policy, volumes);
        loose = rows.len();
        // Tier 0 rows keep their parsed metrics; tier 1 only contributes new terms.
        let added = outcome.merge_new_terms(rows);
        if added > 0 {
            outcome.tier = Tier::LooseDelimiter;
        }
        debug!(target: "extract", rows = loose, added, "tier 1 loose delimiter");
    }

    if policy.tiers.token_salvage && structured == 0 && loose == 0 {
        let rows = fallback::salvage_tokens(text, policy);
        debug!(target: "extract", rows = rows.len(), "tier 2 token salvage");
        if !rows.is_empty() {
            outcome.candidates = rows;
            outcome.tier = Tier::TokenSalvage;
        }
    }

    if policy.tiers.curated && outcome.len() < policy.min_candidates {
        let added = fallback::top_up_curated(&mut outcome.candidates, policy);
        debug!(target: "extract", added, "tier 3 curated");
        if added > 0 {
            outcome.tier = Tier::Curated;
        }
    }

    if outcome.is_empty() {
        counter!("extract_failures_total").increment(1);
        return Err(AnalysisError::ExtractionFailure);
    }

    counter!("extract_tier_total", "tier" => outcome.tier.as_str()).increment(1);
    Ok(outcome)
}
