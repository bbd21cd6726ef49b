//! # Analysis Engine
//! One request: validate subject → model call → parse chain → assemble.
//!
//! `build_report` is the pure half (no I/O, injectable randomness and clock);
//! `run_analysis` adds the single awaited model call in front of it.

use chrono::{DateTime, Local, TimeZone};
use tracing::{info, warn};

use crate::config::ParsePolicy;
use crate::error::AnalysisError;
use crate::extract::{self, assemble_report, extract_summary, RandomVolumes, VolumeSource};
use crate::model::{build_prompt, ModelResponse, TrendModel};
use crate::report::MarketReport;

/// Short, non-reversible id for logging a subject without logging the subject.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Trimmed subject, or `EmptySubject`.
pub fn validate_subject(subject: &str) -> Result<&str, AnalysisError> {
    let s = subject.trim();
    if s.is_empty() {
        Err(AnalysisError::EmptySubject)
    } else {
        Ok(s)
    }
}

/// Parse a model response into a report. Pure: the clock and the volume
/// source are passed in.
pub fn build_report<Tz: TimeZone>(
    subject: &str,
    response: ModelResponse,
    policy: &ParsePolicy,
    volumes: &mut dyn VolumeSource,
    now: &DateTime<Tz>,
) -> Result<MarketReport, AnalysisError>
where
    Tz::Offset: std::fmt::Display,
{
    if response.text.trim().is_empty() {
        return Err(AnalysisError::UpstreamEmpty);
    }
    let summary = extract_summary(&response.text, &policy.markers, &policy.summary_placeholder);
    let outcome = extract::run_chain(&response.text, policy, volumes)?;
    Ok(assemble_report(
        subject,
        summary,
        outcome,
        response.sources,
        policy,
        now,
    ))
}

/// Full analysis for one subject. No retries: upstream errors and extraction
/// failure are returned as-is.
pub async fn run_analysis(
    model: &dyn TrendModel,
    policy: &ParsePolicy,
    subject: &str,
) -> Result<MarketReport, AnalysisError> {
    let subject = validate_subject(subject)?;
    let id = anon_hash(subject);
    info!(target: "engine", %id, provider = model.provider_name(), "analysis started");

    let prompt = build_prompt(subject, &policy.markers, policy.keyword_cap());
    let response = model.generate(&prompt).await.inspect_err(|e| {
        warn!(target: "engine", %id, kind = e.kind(), "model call failed");
    })?;

    // ThreadRng is !Send; keep it out of any await.
    let mut volumes = RandomVolumes::default();
    let report = build_report(subject, response, policy, &mut volumes, &Local::now())
        .inspect_err(|e| warn!(target: "engine", %id, kind = e.kind(), "extraction failed"))?;

    info!(
        target: "engine",
        %id,
        tier = report.tier.as_str(),
        keywords = report.keywords.len(),
        sources = report.sources.len(),
        "analysis finished"
    );
    Ok(report)
}
