// tests/fallback_chain.rs
//
// Tier escalation over whole responses, through the public pipeline entry points.

use chrono::Utc;
use market_trend_report::extract::{run_chain, FixedVolume, RandomVolumes};
use market_trend_report::model::ModelResponse;
use market_trend_report::{build_report, AnalysisError, ParsePolicy, Tier, Trend};

fn response(text: &str) -> ModelResponse {
    ModelResponse {
        text: text.to_string(),
        sources: vec![],
    }
}

fn prose_lines(n: usize) -> String {
    (0..n)
        .map(|i| format!("Observation {i} shows bakers adapting to changing customer habits"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn one_row_and_prose_triggers_loose_rescan_without_regressing() {
    let text = format!(
        "SUMMARY: Mixed signals.\nDATA_TABLE:\nSourdough | 45,000 | Up | 25%\n{}",
        prose_lines(49)
    );
    let out = run_chain(&text, &ParsePolicy::strict(), &mut FixedVolume(1)).unwrap();
    // tier 1 only re-finds the same row, so the structured row stands
    assert_eq!(out.len(), 1);
    assert_eq!(out.candidates[0].term(), "Sourdough");
    assert_eq!(out.candidates[0].volume(), 45_000);
}

#[test]
fn loose_rescan_adds_hyphen_items_found_anywhere() {
    let text = format!(
        "SUMMARY: Mixed signals.\n- Croissants - popular\n- Baguettes - steady\nDATA_TABLE:\n\
         Sourdough | 45,000 | Up | 25%\n{}",
        prose_lines(10)
    );
    let out = run_chain(&text, &ParsePolicy::strict(), &mut FixedVolume(900)).unwrap();
    assert_eq!(out.tier, Tier::LooseDelimiter);
    assert_eq!(out.len(), 3);
    assert!(out.len() >= 1, "never below the structured count");
    let loose: Vec<_> = out.candidates.iter().filter(|r| r.relevance() == 50).collect();
    assert_eq!(loose.len(), 2);
    assert!(loose.iter().all(|r| r.trend() == Trend::Stable));
}

#[test]
fn summary_without_table_reaches_token_salvage() {
    let text = "SUMMARY: Wedding photographers increasingly market drone footage and \
                storytelling packages alongside traditional portraits, albums, retouching \
                services, engagement sessions and destination coverage.";
    let out = run_chain(text, &ParsePolicy::strict(), &mut FixedVolume(1)).unwrap();
    assert_eq!(out.tier, Tier::TokenSalvage);
    assert!(out.len() <= 10);
    assert!(out.len() > 0);
    assert!(out.candidates.iter().all(|r| r.trend() == Trend::Stable));
    assert!(out.candidates.iter().all(|r| r.change_percent() == 0.0));
}

#[test]
fn salvage_yielding_nothing_is_extraction_failure_in_strict_mode() {
    let text = "SUMMARY: n/a\nok";
    let err = build_report("Baker", response(text), &ParsePolicy::strict(), &mut FixedVolume(1), &Utc::now())
        .unwrap_err();
    assert_eq!(err, AnalysisError::ExtractionFailure);
    assert_eq!(err.to_string(), "Could not extract structured data from the model response.");
}

#[test]
fn lenient_mode_never_returns_an_empty_report() {
    let text = "SUMMARY: n/a\nok";
    let policy = ParsePolicy::lenient();
    let report = build_report("Baker", response(text), &policy, &mut FixedVolume(1), &Utc::now()).unwrap();
    assert_eq!(report.tier, Tier::Curated);
    assert_eq!(report.keywords.len(), policy.min_candidates);
    assert_eq!(report.summary, "n/a\nok");
}

#[test]
fn salvage_disabled_goes_straight_to_failure() {
    let mut policy = ParsePolicy::strict();
    policy.tiers.token_salvage = false;
    let text = "SUMMARY: Plenty of long descriptive wording without any structure whatsoever.";
    let err = run_chain(text, &policy, &mut FixedVolume(1)).unwrap_err();
    assert_eq!(err, AnalysisError::ExtractionFailure);
}

#[test]
fn legacy_markers_are_still_read() {
    let text = "SUMMARY: legacy\nKEYWORDS_START\n\
                Rye | 100 | up | 1%\nSpelt | 200 | down | -1%\nEinkorn | 300 | up | 2%\n\
                Emmer | 400 | up | 3%\nKamut | 500 | stable | 0%\n\
                KEYWORDS_END\n- Trailing - chatter";
    let report = build_report(
        "Baker",
        response(text),
        &ParsePolicy::strict(),
        &mut RandomVolumes::seeded(3),
        &Utc::now(),
    )
    .unwrap();
    assert_eq!(report.summary, "legacy");
    assert_eq!(report.tier, Tier::Structured);
    let terms: Vec<&str> = report.keywords.iter().map(|k| k.term()).collect();
    assert_eq!(terms, vec!["Kamut", "Emmer", "Einkorn", "Spelt", "Rye"]);
}

#[test]
fn hyphenated_table_term_is_not_split_by_loose_rescan() {
    let text = "SUMMARY: Two rows.\nDATA_TABLE:\n\
                Gluten-free bread | 4,000 | up | 3%\n\
                Sourdough | 45,000 | Up | 25%";
    let out = run_chain(text, &ParsePolicy::strict(), &mut FixedVolume(1)).unwrap();
    let terms: Vec<&str> = out.candidates.iter().map(|r| r.term()).collect();
    assert_eq!(terms, vec!["Gluten-free bread", "Sourdough"]);
    // nothing new came from tier 1, so provenance stays structured
    assert_eq!(out.tier, Tier::Structured);
    assert_eq!(out.candidates[0].volume(), 4_000);
}
